//! Documentation links for the crates behind the playground

use crate::output::DocsResult;

const DOCS_HOST: &str = "https://docs.rs";

/// Kind of rustdoc item page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Struct,
    Enum,
    Fn,
    Trait,
}

impl ItemKind {
    fn prefix(&self) -> &'static str {
        match self {
            ItemKind::Struct => "struct",
            ItemKind::Enum => "enum",
            ItemKind::Fn => "fn",
            ItemKind::Trait => "trait",
        }
    }
}

/// docs.rs location of one published crate version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Documentation {
    package: String,
    version: Option<String>,
}

impl Documentation {
    /// An empty `version` links to the latest release
    pub fn from_package(package: &str, version: &str) -> Self {
        let version = version.trim();
        Self {
            package: package.to_string(),
            version: (!version.is_empty()).then(|| version.to_string()),
        }
    }

    /// Library name as it appears in paths (`regex-syntax` -> `regex_syntax`)
    pub fn crate_name(&self) -> String {
        self.package.replace('-', "_")
    }

    pub fn home_url(&self) -> String {
        format!(
            "{}/{}/{}/{}/",
            DOCS_HOST,
            self.package,
            self.version.as_deref().unwrap_or("latest"),
            self.crate_name()
        )
    }

    /// Page for an item; `path` may include modules, e.g. `ast::Ast`
    pub fn item_url(&self, kind: ItemKind, path: &str) -> String {
        let (modules, name) = match path.rsplit_once("::") {
            Some((modules, name)) => (format!("{}/", modules.replace("::", "/")), name),
            None => (String::new(), path),
        };
        format!(
            "{}{}{}.{}.html",
            self.home_url(),
            modules,
            kind.prefix(),
            name
        )
    }
}

/// Resolve the home page for `package` at `version`
pub fn resolve(package: &str, version: &str) -> DocsResult {
    let docs = Documentation::from_package(package, version);
    DocsResult {
        package: package.to_string(),
        version: docs.version.clone(),
        home_url: docs.home_url(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versioned_home_url() {
        let docs = Documentation::from_package("regex", "1.10.2");
        assert_eq!(docs.home_url(), "https://docs.rs/regex/1.10.2/regex/");
    }

    #[test]
    fn test_missing_version_defaults_to_latest() {
        let docs = Documentation::from_package("regex-syntax", "  ");
        assert_eq!(
            docs.home_url(),
            "https://docs.rs/regex-syntax/latest/regex_syntax/"
        );
    }

    #[test]
    fn test_item_urls() {
        let docs = Documentation::from_package("regex", "");
        assert_eq!(
            docs.item_url(ItemKind::Struct, "Regex"),
            "https://docs.rs/regex/latest/regex/struct.Regex.html"
        );
        let docs = Documentation::from_package("regex-syntax", "0.8.2");
        assert_eq!(
            docs.item_url(ItemKind::Enum, "ast::Ast"),
            "https://docs.rs/regex-syntax/0.8.2/regex_syntax/ast/enum.Ast.html"
        );
    }

    #[test]
    fn test_resolve() {
        let result = resolve("regex", "");
        assert_eq!(result.version, None);
        assert_eq!(result.home_url, "https://docs.rs/regex/latest/regex/");
    }
}
