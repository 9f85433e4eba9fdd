use super::error::Error;

/// Extract the database id out of a `NOTION_TABLE_URL` value.
///
/// Accepts a full workspace URL (`https://www.notion.so/ws/Slug-<32 hex>?v=`),
/// a bare 32 hex digit id, or an already dashed UUID. The id is normalized to
/// its dashed form.
pub fn parse_database_id(input: &str) -> Result<String, Error> {
    let segment = input
        .split(['?', '#'])
        .next()
        .unwrap_or(input)
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(input);
    let chars: Vec<char> = segment.chars().filter(|c| *c != '-').collect();
    if chars.len() < 32 {
        return Err(Error::BadTableUrl(input.to_owned()));
    }
    let id: String = chars[chars.len() - 32..].iter().collect();
    if !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::BadTableUrl(input.to_owned()));
    }
    Ok(format!(
        "{}-{}-{}-{}-{}",
        &id[..8],
        &id[8..12],
        &id[12..16],
        &id[16..20],
        &id[20..]
    ))
}

#[cfg(test)]
#[test]
fn test_parse_database_id() {
    const ID: &str = "8a33dfac-6429-4764-9118-ad09bc12c8ce";

    // workspace URL with a view parameter
    assert_eq!(
        parse_database_id(
            "https://www.notion.so/myws/Stars-8a33dfac642947649118ad09bc12c8ce?v=abc"
        )
        .unwrap(),
        ID
    );
    // bare compact id
    assert_eq!(parse_database_id("8a33dfac642947649118ad09bc12c8ce").unwrap(), ID);
    // already dashed
    assert_eq!(parse_database_id(ID).unwrap(), ID);
    // no id present
    assert!(parse_database_id("https://www.notion.so/myws/Stars").is_err());
    // trailing non-hex garbage
    assert!(parse_database_id("8a33dfac642947649118ad09bc12c8zz").is_err());
}
