//! Fragment source preparation: comment stripping and prefix injection.

const COMMENT_MARKER: &str = "//";

/// Strips `//` line comments and joins the lines with `\n`.
///
/// Each line is cut at the first `//`. There is no awareness of string
/// literals or block comments, so a `//` inside `/* ... */` still truncates
/// the line.
pub fn preprocess<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|line| strip_comment(line.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_MARKER) {
        Some(at) => &line[..at],
        None => line,
    }
}

/// Full fragment stage source: `prefix` followed by the preprocessed body.
pub fn fragment_source<S: AsRef<str>>(prefix: &str, lines: &[S]) -> String {
    let body = preprocess(lines);
    let mut source = String::with_capacity(prefix.len() + body.len());
    source.push_str(prefix);
    source.push_str(&body);
    source
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines_of(text: &str) -> Vec<&str> {
        text.split('\n').collect()
    }

    #[test]
    fn line_without_marker_is_unchanged() {
        let lines = ["vec3 col = vec3(0.5);", "  gl_FragColor = vec4(col, 1.0);"];
        assert_eq!(
            preprocess(&lines),
            "vec3 col = vec3(0.5);\n  gl_FragColor = vec4(col, 1.0);"
        );
    }

    #[test]
    fn line_is_cut_at_first_marker() {
        let lines = ["float d = 1.0; // distance // again"];
        assert_eq!(preprocess(&lines), "float d = 1.0; ");
    }

    #[test]
    fn whole_line_comment_becomes_empty_line() {
        let lines = ["// header", "void main(){}"];
        assert_eq!(preprocess(&lines), "\nvoid main(){}");
    }

    #[test]
    fn marker_inside_string_literal_still_cuts() {
        let lines = [r#"const char* url = "http://example";"#];
        assert_eq!(preprocess(&lines), r#"const char* url = "http:"#);
    }

    #[test]
    fn single_slash_is_not_a_comment() {
        let lines = ["float h = a / b;"];
        assert_eq!(preprocess(&lines), "float h = a / b;");
    }

    #[test]
    fn order_and_line_count_are_preserved() {
        let lines = ["a // 1", "b", "c // 3", ""];
        let out = preprocess(&lines);
        assert_eq!(out.split('\n').collect::<Vec<_>>(), vec!["a ", "b", "c ", ""]);
    }

    #[test]
    fn empty_input_is_empty_output() {
        let lines: [&str; 0] = [];
        assert_eq!(preprocess(&lines), "");
    }

    #[test]
    fn preprocess_is_idempotent() {
        let text = "void main() // entry\n{\n  // nothing\n  gl_FragColor = vec4(1.0); // white\n}";
        let once = preprocess(&lines_of(text));
        let twice = preprocess(&lines_of(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn fragment_source_prepends_prefix() {
        let lines = ["void main(){} // done"];
        assert_eq!(
            fragment_source("#version 120\n", &lines),
            "#version 120\nvoid main(){} "
        );
    }
}
