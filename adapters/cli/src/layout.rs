use std::{fmt, str::FromStr};

use lane_defence_core::{GridCell, TowerKind, TowerView};
use thiserror::Error;

const LAYOUT_DOMAIN: &str = "lane";
const LAYOUT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded tower list.
pub(crate) const LAYOUT_HEADER: &str = "lane:v1";
/// Delimiter used to separate the prefix, version and tower list.
const FIELD_DELIMITER: char = ':';
/// Delimiter used between towers in the list.
const TOWER_DELIMITER: char = ';';

/// Tower kind and cell, written as `kind@column,row`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TowerPlacement {
    pub(crate) kind: TowerKind,
    pub(crate) cell: GridCell,
}

impl fmt::Display for TowerPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{},{}",
            kind_name(self.kind),
            self.cell.column(),
            self.cell.row()
        )
    }
}

impl FromStr for TowerPlacement {
    type Err = LayoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || LayoutError::InvalidPlacement(value.to_owned());

        let (kind, cell) = value.trim().split_once('@').ok_or_else(invalid)?;
        let kind = parse_kind(kind.trim())?;
        let (column, row) = cell.split_once(',').ok_or_else(invalid)?;
        let column = column.trim().parse::<i32>().map_err(|_| invalid())?;
        let row = row.trim().parse::<i32>().map_err(|_| invalid())?;

        Ok(Self {
            kind,
            cell: GridCell::new(column, row),
        })
    }
}

/// Towers of a session captured as a single-line string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TowerLayout {
    pub(crate) towers: Vec<TowerPlacement>,
}

impl TowerLayout {
    /// Captures the towers currently placed in the world.
    #[must_use]
    pub(crate) fn capture(towers: &TowerView) -> Self {
        Self {
            towers: towers
                .iter()
                .map(|tower| TowerPlacement {
                    kind: tower.kind,
                    cell: tower.cell,
                })
                .collect(),
        }
    }

    /// Encodes the layout into a string accepted by `--layout`.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let towers: Vec<String> = self.towers.iter().map(ToString::to_string).collect();
        format!("{LAYOUT_HEADER}:{}", towers.join(";"))
    }
}

impl FromStr for TowerLayout {
    type Err = LayoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutError::EmptyPayload);
        }

        let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
        let domain = parts.next().unwrap_or_default();
        let version = parts.next().ok_or(LayoutError::MissingVersion)?;
        let payload = parts.next().ok_or(LayoutError::MissingPayload)?;

        if domain != LAYOUT_DOMAIN {
            return Err(LayoutError::InvalidPrefix(domain.to_owned()));
        }
        if version != LAYOUT_VERSION {
            return Err(LayoutError::UnsupportedVersion(version.to_owned()));
        }

        let towers = payload
            .split(TOWER_DELIMITER)
            .filter(|entry| !entry.trim().is_empty())
            .map(TowerPlacement::from_str)
            .collect::<Result<_, _>>()?;

        Ok(Self { towers })
    }
}

/// Errors that can occur while decoding layout strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum LayoutError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout string was empty")]
    EmptyPayload,
    /// The layout did not contain a version segment.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// The layout did not include the tower list.
    #[error("layout string is missing the tower list")]
    MissingPayload,
    /// The layout used an unexpected prefix segment.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The layout used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// A tower entry did not follow `kind@column,row`.
    #[error("could not parse tower '{0}', expected kind@column,row")]
    InvalidPlacement(String),
    /// A tower entry named an unknown kind.
    #[error("unknown tower kind '{0}', expected regular, ice or fire")]
    UnknownKind(String),
}

fn kind_name(kind: TowerKind) -> &'static str {
    match kind {
        TowerKind::Regular => "regular",
        TowerKind::Ice => "ice",
        TowerKind::Fire => "fire",
    }
}

fn parse_kind(value: &str) -> Result<TowerKind, LayoutError> {
    TowerKind::ALL
        .into_iter()
        .find(|kind| value.eq_ignore_ascii_case(kind_name(*kind)))
        .ok_or_else(|| LayoutError::UnknownKind(value.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_parses_kind_and_cell() {
        let placement: TowerPlacement = "Ice@4, 7".parse().expect("placement parses");
        assert_eq!(
            placement,
            TowerPlacement {
                kind: TowerKind::Ice,
                cell: GridCell::new(4, 7),
            }
        );
        assert_eq!(placement.to_string(), "ice@4,7");
    }

    #[test]
    fn malformed_placements_are_rejected() {
        assert_eq!(
            "laser@1,1".parse::<TowerPlacement>(),
            Err(LayoutError::UnknownKind("laser".to_owned()))
        );
        assert_eq!(
            "fire@1".parse::<TowerPlacement>(),
            Err(LayoutError::InvalidPlacement("fire@1".to_owned()))
        );
        assert_eq!(
            "fire".parse::<TowerPlacement>(),
            Err(LayoutError::InvalidPlacement("fire".to_owned()))
        );
    }

    #[test]
    fn empty_layout_encodes_header_only() {
        let layout = TowerLayout::default();
        assert_eq!(layout.encode(), format!("{LAYOUT_HEADER}:"));
        assert_eq!(layout.encode().parse::<TowerLayout>(), Ok(layout));
    }

    #[test]
    fn populated_layout_decodes_in_order() {
        let layout: TowerLayout = "lane:v1:regular@2,3;fire@8,5"
            .parse()
            .expect("layout decodes");
        assert_eq!(
            layout.towers,
            vec![
                TowerPlacement {
                    kind: TowerKind::Regular,
                    cell: GridCell::new(2, 3),
                },
                TowerPlacement {
                    kind: TowerKind::Fire,
                    cell: GridCell::new(8, 5),
                },
            ]
        );
        assert_eq!(layout.encode(), "lane:v1:regular@2,3;fire@8,5");
    }

    #[test]
    fn foreign_headers_are_rejected() {
        assert_eq!(
            "grid:v1:regular@2,3".parse::<TowerLayout>(),
            Err(LayoutError::InvalidPrefix("grid".to_owned()))
        );
        assert_eq!(
            "lane:v9:".parse::<TowerLayout>(),
            Err(LayoutError::UnsupportedVersion("v9".to_owned()))
        );
        assert_eq!("lane".parse::<TowerLayout>(), Err(LayoutError::MissingVersion));
        assert_eq!("  ".parse::<TowerLayout>(), Err(LayoutError::EmptyPayload));
    }
}
