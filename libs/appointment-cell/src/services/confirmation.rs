use uuid::Uuid;

pub const CONFIRMATION_PREFIX: &str = "BK-";
const CODE_LENGTH: usize = 8;

/// `BK-` followed by 8 uppercase hex characters taken from a v4 uuid.
pub fn generate_confirmation_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}{}", CONFIRMATION_PREFIX, hex[..CODE_LENGTH].to_uppercase())
}

pub fn is_valid_confirmation_id(value: &str) -> bool {
    value
        .strip_prefix(CONFIRMATION_PREFIX)
        .is_some_and(|code| {
            code.len() == CODE_LENGTH
                && code.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        })
}
