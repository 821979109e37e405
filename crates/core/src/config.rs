use std::{collections::BTreeMap, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl Version {
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Reads the leading `major[.minor[.patch]]` of a server version banner
    /// such as `16.2 (Debian 16.2-1.pgdg120+2)` or `3.45.1`.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split_whitespace().next()?.split('.');
        let major = parse_version_component(parts.next()?)?;
        let minor = parts.next().and_then(parse_version_component).unwrap_or(0);
        let patch = parts.next().and_then(parse_version_component).unwrap_or(0);

        Some(Self::new(major, minor, patch))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: String,
    pub socket: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl ConnectionConfig {
    pub fn database(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }
}

fn parse_version_component(raw: &str) -> Option<u16> {
    let digits = raw
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect::<String>();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u16>().ok()
}

#[cfg(test)]
mod tests {
    use super::Version;

    #[test]
    fn parses_postgres_banner() {
        assert_eq!(
            Version::parse("16.2 (Debian 16.2-1.pgdg120+2)"),
            Some(Version::new(16, 2, 0))
        );
    }

    #[test]
    fn parses_three_part_version() {
        assert_eq!(Version::parse("3.45.1"), Some(Version::new(3, 45, 1)));
        assert_eq!(Version::parse("9.6beta1"), Some(Version::new(9, 6, 0)));
    }

    #[test]
    fn rejects_non_numeric_banner() {
        assert_eq!(Version::parse("devel"), None);
        assert_eq!(Version::parse(""), None);
    }

    #[test]
    fn orders_by_component() {
        assert!(Version::new(9, 5, 0) < Version::new(9, 6, 0));
        assert!(Version::new(10, 0, 0) > Version::new(9, 6, 25));
    }
}
