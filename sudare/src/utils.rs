use csv_core::ReadFieldResult;

/// Splits a CSV row into fields, unquoting them.
pub fn parse_csv_row(row: &str) -> Vec<String> {
    let mut features = vec![];
    let mut rdr = csv_core::Reader::new();
    let mut bytes = row.as_bytes();
    let mut output = [0; 4096];
    let mut field = vec![];
    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        field.extend_from_slice(&output[..nout]);
        bytes = &bytes[nin..];
        let end = match result {
            ReadFieldResult::OutputFull => continue,
            ReadFieldResult::InputEmpty | ReadFieldResult::End => true,
            ReadFieldResult::Field { .. } => false,
        };
        // The input is a str and fields are split at ASCII bytes.
        features.push(String::from_utf8_lossy(&field).into_owned());
        field.clear();
        if end {
            break;
        }
    }
    features
}

/// Returns the length of the string in UTF-16 units.
#[inline(always)]
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_row() {
        assert_eq!(
            &["名詞", "トスカーナ"],
            parse_csv_row("名詞,トスカーナ").as_slice()
        );
    }

    #[test]
    fn test_parse_csv_row_with_quote() {
        assert_eq!(
            &["名詞", "1,2-ジクロロエタン"],
            parse_csv_row("名詞,\"1,2-ジクロロエタン\"").as_slice()
        );
    }

    #[test]
    fn test_parse_csv_row_empty_fields() {
        assert_eq!(&["a", "", "b", ""], parse_csv_row("a,,b,").as_slice());
    }

    #[test]
    fn test_parse_csv_row_long_field() {
        let long = "あ".repeat(3000);
        let row = format!("{long},x");
        let cols = parse_csv_row(&row);
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0], long);
    }

    #[test]
    fn test_utf16_len() {
        assert_eq!(utf16_len("abc"), 3);
        assert_eq!(utf16_len("東京"), 2);
        assert_eq!(utf16_len("😀"), 2);
    }
}
