use rand::seq::SliceRandom;

/// Cosmetic messages shown to clients that hit the upload limit
pub const RATE_LIMIT_MESSAGES: &[&str] = &[
    "You've hit rock bottom with your upload rate!",
    "Your upload frequency is off the Richter scale!",
    "You're mining too many files at once!",
    "You've reached your geological limit!",
    "Time to let the server sediments settle.",
    "You're causing too many seismic uploads!",
    "Your uploads are causing an avalanche!",
    "You've reached your boulder limit!",
    "Your uploads are as frequent as volcanic eruptions!",
    "You've reached your sedimentary limit!",
];

/// Picks one of the rate limit messages uniformly at random
pub fn random_rate_limit_message() -> &'static str {
    RATE_LIMIT_MESSAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Too many uploads. Please try again later.")
}
