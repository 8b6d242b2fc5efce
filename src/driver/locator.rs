//! Locator strategies

use std::fmt;

/// A named way of addressing DOM nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum By {
    /// `id` attribute equals the value
    Id(String),
    /// Class list contains the value as a whole token
    ClassName(String),
    /// Tag name, case-insensitive
    TagName(String),
    /// CSS selector
    Css(String),
    /// XPath expression, evaluated relative to the search scope
    XPath(String),
}

impl By {
    pub fn id<S: Into<String>>(id: S) -> Self {
        By::Id(id.into())
    }

    pub fn class_name<S: Into<String>>(name: S) -> Self {
        By::ClassName(name.into())
    }

    pub fn tag_name<S: Into<String>>(tag: S) -> Self {
        By::TagName(tag.into())
    }

    pub fn css<S: Into<String>>(selector: S) -> Self {
        By::Css(selector.into())
    }

    pub fn xpath<S: Into<String>>(expression: S) -> Self {
        By::XPath(expression.into())
    }

    /// Descendants whose class attribute contains `fragment` anywhere.
    ///
    /// Class attributes are space separated token lists, so this is a
    /// substring predicate rather than a strategy of its own. The leading `.`
    /// keeps the search inside the scope element.
    pub fn partial_class_name(fragment: &str) -> Self {
        By::XPath(format!(
            ".//*[contains(@class, {})]",
            xpath_literal(fragment)
        ))
    }

    /// Strategy name, used in error messages
    pub fn strategy(&self) -> &'static str {
        match self {
            By::Id(_) => "id",
            By::ClassName(_) => "class name",
            By::TagName(_) => "tag name",
            By::Css(_) => "css selector",
            By::XPath(_) => "xpath",
        }
    }

    /// Identifier string
    pub fn value(&self) -> &str {
        match self {
            By::Id(v) | By::ClassName(v) | By::TagName(v) | By::Css(v) | By::XPath(v) => v,
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy(), self.value())
    }
}

/// Quote a string as an XPath 1.0 literal
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_class_name_is_scoped_contains() {
        let by = By::partial_class_name("ia_accordionComponent__header__chevron");
        assert_eq!(
            by,
            By::XPath(".//*[contains(@class, 'ia_accordionComponent__header__chevron')]".into())
        );
    }

    #[test]
    fn test_display_names_locator() {
        assert_eq!(By::id("areaDropdown").to_string(), "id: areaDropdown");
        assert_eq!(
            By::class_name("ia_dropdown__option").to_string(),
            "class name: ia_dropdown__option"
        );
    }

    #[test]
    fn test_xpath_literal_quotes() {
        assert_eq!(xpath_literal("plain"), "'plain'");
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert_eq!(xpath_literal("a'b\"c"), "concat('a', \"'\", 'b\"c')");
    }
}
