use std::{collections::BTreeMap, fmt, str::FromStr};

/// A board known to the server. Every variant owns a literal table name, so
/// a table identifier can only ever come out of this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoardType {
    Free,
    Notice,
    Gallery,
}

impl BoardType {
    pub const ALL: [BoardType; 3] = [BoardType::Free, BoardType::Notice, BoardType::Gallery];

    pub fn key(self) -> &'static str {
        match self {
            BoardType::Free => "free",
            BoardType::Notice => "notice",
            BoardType::Gallery => "gallery",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            BoardType::Free => "자유게시판",
            BoardType::Notice => "공지사항",
            BoardType::Gallery => "갤러리",
        }
    }

    pub fn table_name(self) -> &'static str {
        match self {
            BoardType::Free => "g5_write_free",
            BoardType::Notice => "g5_write_notice",
            BoardType::Gallery => "g5_write_gallery",
        }
    }
}

impl fmt::Display for BoardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown board type `{0}`")]
pub struct UnknownBoard(pub String);

impl FromStr for BoardType {
    type Err = UnknownBoard;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        BoardType::ALL
            .into_iter()
            .find(|board| board.key() == key)
            .ok_or_else(|| UnknownBoard(key.to_string()))
    }
}

/// The set of boards this server answers for. Untrusted path segments must
/// go through [`BoardRegistry::resolve`] before touching the database.
#[derive(Debug, Clone)]
pub struct BoardRegistry {
    enabled: Vec<BoardType>,
}

impl Default for BoardRegistry {
    fn default() -> Self {
        Self {
            enabled: BoardType::ALL.to_vec(),
        }
    }
}

impl BoardRegistry {
    /// Restricts the registry to the listed keys. Unknown keys are skipped.
    pub fn with_allow_list<I, S>(keys: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut enabled = Vec::new();
        for key in keys {
            let key = key.as_ref().trim();
            if key.is_empty() {
                continue;
            }
            match key.parse::<BoardType>() {
                Ok(board) if !enabled.contains(&board) => enabled.push(board),
                Ok(_) => {}
                Err(e) => tracing::warn!("Ignoring board allow-list entry: {e}"),
            }
        }
        if enabled.is_empty() {
            anyhow::bail!("board allow-list does not enable any known board");
        }
        enabled.sort();
        Ok(Self { enabled })
    }

    pub fn resolve(&self, key: &str) -> Option<BoardType> {
        key.parse::<BoardType>()
            .ok()
            .filter(|board| self.enabled.contains(board))
    }

    pub fn is_valid_board_type(&self, key: &str) -> bool {
        self.resolve(key).is_some()
    }

    pub fn title_for(&self, key: &str) -> Option<&'static str> {
        self.resolve(key).map(BoardType::title)
    }

    pub fn boards(&self) -> &[BoardType] {
        &self.enabled
    }

    pub fn titles(&self) -> BTreeMap<&'static str, &'static str> {
        self.enabled
            .iter()
            .map(|board| (board.key(), board.title()))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_registry_accepts_known_boards() {
        let registry = BoardRegistry::default();
        assert!(registry.is_valid_board_type("free"));
        assert!(registry.is_valid_board_type("notice"));
        assert!(registry.is_valid_board_type("gallery"));
        assert_eq!(registry.title_for("free"), Some("자유게시판"));
        assert_eq!(registry.title_for("notice"), Some("공지사항"));
        assert_eq!(registry.title_for("gallery"), Some("갤러리"));
    }

    #[test]
    fn test_unknown_or_mangled_keys_are_rejected() {
        let registry = BoardRegistry::default();
        for key in ["blog", "", "Free", "free ", "free; DROP TABLE g5_write_free", "../free"] {
            assert!(!registry.is_valid_board_type(key), "{key:?} should be rejected");
            assert_eq!(registry.title_for(key), None);
        }
    }

    #[test]
    fn test_table_names_are_prefixed_constants() {
        for board in BoardType::ALL {
            assert_eq!(board.table_name(), format!("g5_write_{}", board.key()));
        }
    }

    #[test]
    fn test_parse_unknown_board() {
        assert_eq!("notice".parse::<BoardType>(), Ok(BoardType::Notice));
        let err = "blog".parse::<BoardType>().unwrap_err();
        assert_eq!(err, UnknownBoard("blog".into()));
        assert_eq!(err.to_string(), "unknown board type `blog`");
    }

    #[test]
    fn test_allow_list_restricts_boards() {
        let registry = BoardRegistry::with_allow_list(&["notice", "unknown", "notice"]).unwrap();
        assert_eq!(registry.boards(), &[BoardType::Notice]);
        assert!(!registry.is_valid_board_type("free"));
        assert!(registry.is_valid_board_type("notice"));
    }

    #[test]
    fn test_allow_list_without_known_boards_is_an_error() {
        assert!(BoardRegistry::with_allow_list(&["blog", " "]).is_err());
    }
}
