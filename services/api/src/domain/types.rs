use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Registered account, including the stored password hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user relative to a viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserProfile {
    pub fn of(user: &User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Clone)]
pub struct NewTag {
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone)]
pub struct NewIngredient {
    pub name: String,
    pub measurement_unit: String,
}

/// Quantity of one ingredient in a recipe being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    pub ingredient_id: i32,
    pub amount: i16,
}

/// Stored recipe row without its links.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: i32,
    pub author_id: Uuid,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i16,
    pub pub_date: DateTime<Utc>,
}

/// Validated recipe ready to be persisted with its tag and ingredient links.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub author_id: Uuid,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i16,
    pub tag_ids: Vec<i32>,
    pub ingredients: Vec<IngredientAmount>,
    pub pub_date: DateTime<Utc>,
}

/// Validated recipe update. `None` scalars keep the stored value; links are always replaced.
#[derive(Debug, Clone)]
pub struct RecipeChanges {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i16>,
    pub tag_ids: Vec<i32>,
    pub ingredients: Vec<IngredientAmount>,
}

/// Ingredient line of the recipe read model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i16,
}

/// Recipe read model with every viewer-dependent flag resolved.
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    pub id: i32,
    pub tags: Vec<Tag>,
    pub author: UserProfile,
    pub ingredients: Vec<RecipeIngredient>,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i16,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipePreview {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i16,
}

impl From<&Recipe> for RecipePreview {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Author entry of a subscription listing.
#[derive(Debug, Clone)]
pub struct SubscribedAuthor {
    pub profile: UserProfile,
    pub recipes: Vec<RecipePreview>,
    pub recipes_count: u64,
}

/// Recipe list filters. Every supplied dimension must match.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Matches recipes carrying at least one of these tag slugs.
    pub tag_slugs: Vec<String>,
    pub author_id: Option<Uuid>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
}

/// User-to-recipe relation toggled by the favorite and shopping-cart endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleKind {
    Favorite,
    ShoppingCart,
}

/// One aggregated shopping-list line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRow {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

pub const NAME_MAX_LEN: usize = 200;
pub const USERNAME_MAX_LEN: usize = 150;
pub const PERSON_NAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 254;
pub const PASSWORD_MIN_LEN: usize = 8;

/// Validate an email address: one `@`, non-empty local part, dotted domain, at most 254 chars.
pub fn validate_email(email: &str) -> bool {
    if email.is_empty() || email.len() > EMAIL_MAX_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .split_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Validate a username: letters, digits and `_ . @ + -`, 1-150 chars.
pub fn validate_username(username: &str) -> bool {
    if username.is_empty() || username.chars().count() > USERNAME_MAX_LEN {
        return false;
    }
    username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'))
}

pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= PASSWORD_MIN_LEN
}

/// Normalize a `#RRGGBB` color to upper case. Returns `None` when malformed.
pub fn normalize_color(color: &str) -> Option<String> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{}", hex.to_ascii_uppercase()))
}

/// Narrow a positive quantity to the stored `smallint` range (1..=32767).
pub fn small_positive(value: i64) -> Option<i16> {
    i16::try_from(value).ok().filter(|v| *v >= 1)
}

/// First id that occurs more than once, if any.
pub fn first_duplicate(ids: impl IntoIterator<Item = i32>) -> Option<i32> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().find(|id| !seen.insert(*id))
}

/// Parse a boolean query flag. Accepts `1`, `true`, `0` and `false`.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Derive a URL slug: Cyrillic is transliterated, everything lower-cased,
/// runs of other characters collapse to a single `-`, edge dashes trimmed.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            push_slug_piece(&mut slug, &mut pending_dash, c.encode_utf8(&mut [0; 4]));
        } else if let Some(latin) = transliterate(c) {
            // hard and soft signs vanish without splitting the word
            if !latin.is_empty() {
                push_slug_piece(&mut slug, &mut pending_dash, latin);
            }
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn push_slug_piece(slug: &mut String, pending_dash: &mut bool, piece: &str) {
    if *pending_dash && !slug.is_empty() {
        slug.push('-');
    }
    *pending_dash = false;
    slug.push_str(piece);
}

fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(latin)
}

pub const CART_CSV_HEADER: [&str; 3] = ["ingredient", "measurement_unit", "amount"];

/// Render the shopping list as `;`-delimited text with a header line.
pub fn render_cart_csv(rows: &[CartRow]) -> String {
    let mut out = String::new();
    push_csv_line(&mut out, &CART_CSV_HEADER);
    for row in rows {
        let amount = row.amount.to_string();
        push_csv_line(&mut out, &[&row.name, &row.measurement_unit, &amount]);
    }
    out
}

fn push_csv_line(out: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        out.push_str(&escape_csv_field(field));
    }
    out.push('\n');
}

fn escape_csv_field(field: &str) -> String {
    if field.contains([';', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
