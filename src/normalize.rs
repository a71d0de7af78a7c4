//! Normalize Module
//!
//! ワークブック方式の空白正規化ルール。

/// セルのテキストを正規化
///
/// 前後の空白を除去し、内部の連続する空白文字（改行・タブを含む）を
/// 半角スペース1つにまとめます。
pub fn clean_cell_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 正規化済みの値を行テキストに結合
///
/// 空の値は除外されます。すべて空の場合は空文字列を返します。
pub fn join_row<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut row = String::new();
    for value in values {
        let value = value.as_ref();
        if value.is_empty() {
            continue;
        }
        if !row.is_empty() {
            row.push(' ');
        }
        row.push_str(value);
    }
    row
}

/// 蓄積したテキストの前後の空白を除去して返す
pub fn finish_text(acc: &str) -> String {
    acc.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_cell_text_collapses_runs() {
        assert_eq!(clean_cell_text("Hello   World"), "Hello World");
        assert_eq!(clean_cell_text("  B  "), "B");
        assert_eq!(clean_cell_text("a\t\tb\nc"), "a b c");
    }

    #[test]
    fn test_clean_cell_text_whitespace_only() {
        assert_eq!(clean_cell_text("   "), "");
        assert_eq!(clean_cell_text("\n\t"), "");
        assert_eq!(clean_cell_text(""), "");
    }

    #[test]
    fn test_join_row_skips_empty() {
        assert_eq!(join_row(["A", "", "B"]), "A B");
        assert_eq!(join_row(["", ""]), "");
        assert_eq!(join_row(Vec::<String>::new()), "");
    }

    #[test]
    fn test_finish_text() {
        assert_eq!(finish_text("\nX\nY\n"), "X\nY");
        assert_eq!(finish_text("   "), "");
    }

    // プロパティベーステスト
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_clean_cell_text_shape(raw in "[ \t\na-zA-Z0-9]{0,40}") {
                let cleaned = clean_cell_text(&raw);

                prop_assert_eq!(cleaned.trim(), cleaned.as_str());
                prop_assert!(!cleaned.contains("  "));
                prop_assert!(!cleaned.contains('\t'));
                prop_assert!(!cleaned.contains('\n'));
                prop_assert_eq!(clean_cell_text(&cleaned), cleaned.clone());
            }

            #[test]
            fn test_join_row_never_pads(values in proptest::collection::vec("[a-z ]{0,6}", 0..8)) {
                let cleaned: Vec<String> = values.iter().map(|v| clean_cell_text(v)).collect();
                let row = join_row(&cleaned);

                prop_assert_eq!(row.trim(), row.as_str());
                prop_assert!(!row.contains("  "));
            }
        }
    }
}
