//! Read-only player catalogs, one per sport.
//!
//! Catalogs are loaded once at startup from a CSV or JSON file and never
//! change afterwards.

use crate::models::{Player, PlayerId, Sport};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("cannot read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad CSV catalog: {0}")]
    Csv(#[from] csv::Error),
    #[error("bad JSON catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid catalog: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug)]
pub struct Catalog {
    sport: Sport,
    players: Vec<Player>,
    index: HashMap<PlayerId, usize>,
}

impl Catalog {
    pub fn empty(sport: Sport) -> Self {
        Self {
            sport,
            players: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Build a catalog, rejecting duplicate ids and roles foreign to `sport`.
    pub fn from_players(sport: Sport, players: Vec<Player>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(players.len());
        for (i, player) in players.iter().enumerate() {
            if !sport.has_role(player.role) {
                return Err(CatalogError::Invalid(format!(
                    "player {} has role {} which is not a {sport} role",
                    player.id, player.role
                )));
            }
            if index.insert(player.id, i).is_some() {
                return Err(CatalogError::Invalid(format!(
                    "duplicate player id {}",
                    player.id
                )));
            }
        }
        Ok(Self {
            sport,
            players,
            index,
        })
    }

    pub fn from_csv_reader(sport: Sport, reader: impl Read) -> Result<Self, CatalogError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let players = rdr
            .deserialize::<Player>()
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_players(sport, players)
    }

    pub fn from_json_reader(sport: Sport, reader: impl Read) -> Result<Self, CatalogError> {
        let players: Vec<Player> = serde_json::from_reader(reader)?;
        Self::from_players(sport, players)
    }

    /// Load from `path`; `.json` files are parsed as a JSON array, anything
    /// else as CSV with a header row.
    pub fn load(sport: Sport, path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_reader(sport, std::io::BufReader::new(file))
        } else {
            Self::from_csv_reader(sport, file)
        }
    }

    pub fn sport(&self) -> Sport {
        self.sport
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.index.get(&id).map(|&i| &self.players[i])
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// A real-world competition a fantasy tournament can follow
/// (`settings.realTournament` holds its id).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RealTournament {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub sport: Sport,
}

const fn real(
    id: &'static str,
    name: &'static str,
    kind: &'static str,
    sport: Sport,
) -> RealTournament {
    RealTournament {
        id,
        name,
        kind,
        sport,
    }
}

static REAL_CRICKET: [RealTournament; 8] = [
    real("ipl-2024", "Indian Premier League 2024", "T20", Sport::Cricket),
    real("world-cup-2024", "ICC T20 World Cup 2024", "T20", Sport::Cricket),
    real("the-hundred-2024", "The Hundred 2024", "The Hundred", Sport::Cricket),
    real("cpl-2024", "Caribbean Premier League 2024", "T20", Sport::Cricket),
    real("bbl-2024", "Big Bash League 2024", "T20", Sport::Cricket),
    real("psl-2024", "Pakistan Super League 2024", "T20", Sport::Cricket),
    real("eng-vs-ind-2024", "England vs India Test Series 2024", "Test", Sport::Cricket),
    real(
        "aus-vs-sa-2024",
        "Australia vs South Africa ODI Series 2024",
        "ODI",
        Sport::Cricket,
    ),
];

static REAL_KABADDI: [RealTournament; 6] = [
    real("pkl-2024", "Pro Kabaddi League 2024", "Professional", Sport::Kabaddi),
    real("kabaddi-world-cup-2024", "Kabaddi World Cup 2024", "International", Sport::Kabaddi),
    real("asian-games-kabaddi-2024", "Asian Games Kabaddi 2024", "Multi-sport", Sport::Kabaddi),
    real(
        "masters-kabaddi-2024",
        "Kabaddi Masters Championship 2024",
        "Professional",
        Sport::Kabaddi,
    ),
    real(
        "junior-kabaddi-2024",
        "Junior Kabaddi World Championship 2024",
        "Youth",
        Sport::Kabaddi,
    ),
    real("women-kabaddi-2024", "Women's Kabaddi League 2024", "Women", Sport::Kabaddi),
];

/// Real-world competitions available for `sport`.
pub fn real_tournaments(sport: Sport) -> &'static [RealTournament] {
    match sport {
        Sport::Cricket => &REAL_CRICKET,
        Sport::Kabaddi => &REAL_KABADDI,
    }
}

/// Both sport catalogs, shared with the room tasks.
#[derive(Clone, Debug)]
pub struct Catalogs {
    pub cricket: Arc<Catalog>,
    pub kabaddi: Arc<Catalog>,
}

impl Catalogs {
    pub fn new(cricket: Catalog, kabaddi: Catalog) -> Self {
        Self {
            cricket: Arc::new(cricket),
            kabaddi: Arc::new(kabaddi),
        }
    }

    pub fn empty() -> Self {
        Self::new(Catalog::empty(Sport::Cricket), Catalog::empty(Sport::Kabaddi))
    }

    pub fn get(&self, sport: Sport) -> &Arc<Catalog> {
        match sport {
            Sport::Cricket => &self.cricket,
            Sport::Kabaddi => &self.kabaddi,
        }
    }
}

impl Default for Catalogs {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    const CRICKET_CSV: &str = "\
id,name,role,country,basePrice,rating,raidPoints,tacklePoints
1,Virat Kohli,Batsman,India,2000000,95,,
2,Jasprit Bumrah,Bowler,India,1800000,93,,
3,MS Dhoni,Wicket-Keeper,India,1500000,90,,
";

    #[test]
    fn loads_csv_with_optional_columns() {
        let catalog = Catalog::from_csv_reader(Sport::Cricket, CRICKET_CSV.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 3);
        let dhoni = catalog.get(3).unwrap();
        assert_eq!(dhoni.role, Role::WicketKeeper);
        assert_eq!(dhoni.base_price, 1_500_000);
        assert_eq!(dhoni.raid_points, None);
        assert!(catalog.get(4).is_none());
    }

    #[test]
    fn loads_json_array() {
        let json = r#"[{"id":7,"name":"Pardeep Narwal","role":"Raider","country":"India",
            "basePrice":900000,"rating":92.5,"raidPoints":1300}]"#;
        let catalog = Catalog::from_json_reader(Sport::Kabaddi, json.as_bytes()).unwrap();
        assert_eq!(catalog.get(7).unwrap().raid_points, Some(1300));
    }

    #[test]
    fn rejects_foreign_role() {
        let err = Catalog::from_csv_reader(Sport::Kabaddi, CRICKET_CSV.as_bytes()).unwrap_err();
        assert!(matches!(err, CatalogError::Invalid(_)));
    }

    #[test]
    fn real_tournaments_match_their_sport() {
        for sport in [Sport::Cricket, Sport::Kabaddi] {
            let listed = real_tournaments(sport);
            assert!(!listed.is_empty());
            assert!(listed.iter().all(|t| t.sport == sport));
        }
        assert_eq!(real_tournaments(Sport::Cricket)[0].id, "ipl-2024");
    }

    #[test]
    fn rejects_duplicate_ids() {
        let players = vec![
            Player::new(1, "A", Role::Batsman, 100),
            Player::new(1, "B", Role::Bowler, 100),
        ];
        let err = Catalog::from_players(Sport::Cricket, players).unwrap_err();
        assert!(err.to_string().contains("duplicate player id 1"));
    }
}
