use super::ApiError;

pub fn validate_section_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid section ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}
