use std::cmp::Ordering;

use super::types::RatingValue;

/// Win probability of a side rated `rating` against a side rated
/// `opponent`, on the standard 400-point logistic curve.
pub fn expected_score(rating: RatingValue, opponent: RatingValue) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - rating) / 400.0))
}

/// Actual score of side A from the score line: win 1.0, draw 0.5, loss 0.0.
pub fn outcome_score(score_a: i32, score_b: i32) -> f64 {
    match score_a.cmp(&score_b) {
        Ordering::Greater => 1.0,
        Ordering::Equal => 0.5,
        Ordering::Less => 0.0,
    }
}

/// Rating movement for both sides of one game: `k * (actual - expected)`.
/// Antisymmetric by construction, so the two deltas always sum to zero.
/// Ratings stay fractional here; rounding is a display concern.
pub fn rating_deltas(
    rating_a: RatingValue,
    rating_b: RatingValue,
    score_a: i32,
    score_b: i32,
    k: f64,
) -> (f64, f64) {
    let expected_a = expected_score(rating_a, rating_b);
    let actual_a = outcome_score(score_a, score_b);
    let delta_a = k * (actual_a - expected_a);
    (delta_a, -delta_a)
}

/// Effective rating of a team: the arithmetic mean of its members'
/// ratings. Callers guarantee `ratings` is non-empty.
pub fn team_rating(ratings: &[RatingValue]) -> RatingValue {
    let sum: f64 = ratings.iter().sum();
    sum / ratings.len() as f64
}
