/// Parse a 1-based page span like "3" or "1-20" into `(first, last)`,
/// inclusive on both ends.
pub fn parse_page_span(input: &str) -> Result<(u32, u32), String> {
    let input = input.trim();
    let (first, last) = match input.split_once('-') {
        Some((a, b)) => (parse_page(a)?, parse_page(b)?),
        None => {
            let page = parse_page(input)?;
            (page, page)
        }
    };
    if first > last {
        return Err(format!("page span {first}-{last} is reversed"));
    }
    Ok((first, last))
}

fn parse_page(s: &str) -> Result<u32, String> {
    let page: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid page number: '{}'", s.trim()))?;
    if page == 0 {
        return Err("page 0 is invalid (pages start at 1)".to_string());
    }
    Ok(page)
}
