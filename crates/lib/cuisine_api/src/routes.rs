//! Route paths.

pub const POST_SIGNUP: &str = "/signup";
pub const POST_LOGIN: &str = "/login";
pub const GET_VERIFY: &str = "/verify";
pub const PUT_PROFILE: &str = "/profile";
pub const FAVORITES: &str = "/favorites";
pub const POST_FORGOT_PASSWORD: &str = "/forgot-password";
pub const POST_RESET_PASSWORD: &str = "/reset-password";
pub const GET_MEALS_SEARCH: &str = "/meals/search";
pub const GET_MEALS_LETTER: &str = "/meals/letter/{letter}";
pub const GET_MEALS_RANDOM: &str = "/meals/random";
pub const GET_MEALS_ID: &str = "/meals/{id}";
pub const GET_HEALTH: &str = "/health";
