//! Identity types shared between the gateway contract and Foodgram services.

pub mod identity;
