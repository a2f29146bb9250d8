use rand::Rng;

/// Generate a tracking code for an order: 4 random bytes rendered as
/// 8 uppercase hex characters. Uniqueness against existing orders is
/// the caller's job (the placement flow re-rolls on collision).
pub fn generate_tracking_code() -> String {
    let bytes: [u8; 4] = rand::rng().random();
    hex::encode_upper(bytes)
}
