//! HTML 转纯文本
//!
//! 题面以 HTML 返回，交给 LLM 前转成纯文本

use std::sync::LazyLock;

use regex::Regex;

static BLOCK_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|pre|li|ul|ol|h[1-6]|tr|blockquote)>").unwrap()
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// 去除 HTML 标签并解码常见实体
pub fn strip_html(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let text = BLOCK_BREAK.replace_all(html, "\n");
    let text = TAG.replace_all(&text, "");
    let text = NUMERIC_ENTITY.replace_all(&text, |caps: &regex::Captures| {
        let raw = &caps[1];
        let code = match raw.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    // &amp; 最后替换，避免 "&amp;lt;" 被解码两次
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&");

    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    BLANK_LINES
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags() {
        let html = "<p>Given an array of integers <code>nums</code></p>";
        let result = strip_html(html);
        assert_eq!(result, "Given an array of integers nums");
    }

    #[test]
    fn test_empty_and_plain() {
        assert_eq!(strip_html(""), "");
        assert_eq!(strip_html("hello world"), "hello world");
    }

    #[test]
    fn test_decodes_entities() {
        let html = "<p><code>1 &lt;= nums.length &lt;= 10<sup>4</sup></code>&nbsp;&amp;&nbsp;&#39;x&#39; &#x2264;</p>";
        assert_eq!(strip_html(html), "1 <= nums.length <= 104 & 'x' ≤");
        assert_eq!(strip_html("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_block_elements_become_lines() {
        let html = "<p>Example 1:</p>\n<pre>Input: nums = [2,7]\nOutput: [0,1]</pre><p></p><p></p><p>Constraints:</p><ul><li>a</li><li>b</li></ul>";
        let text = strip_html(html);
        assert!(text.starts_with("Example 1:\n"));
        assert!(text.contains("Input: nums = [2,7]\nOutput: [0,1]"));
        assert!(text.contains("a\nb"));
        assert!(!text.contains("\n\n\n"));
    }
}
