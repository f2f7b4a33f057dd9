//! Built-in NBA per-game statistics profile and the SQL assistant template.

use crate::types::{ColumnDescriptor, TableProfile};
use frosty_core::{config::DEFAULT_PROFILE, AppResult, QualifiedTableName};

pub const QUALIFIED_TABLE_NAME: &str = "FROSTY_SAMPLE.NBA.PER_GAME_STATS";

pub const TABLE_DESCRIPTION: &str = "This view contains various statistics for NBA players during the 2021-2022 season, representing averages per game.
The statistics include player positions, team affiliations, games played, minutes played, field goals, three-pointers,
free throws, rebounds, assists, steals, blocks, turnovers, personal fouls, and points.";

pub const COLUMNS_HEADING: &str = "Here are the player statistics available in the view:";

/// Instruction template for the assistant. `{{context}}` receives the
/// rendered table context.
pub const GEN_SQL: &str = r#"You will be acting as an AI Snowflake SQL expert named Dan.
Your goal is to give correct, executable SQL queries to users.
You will be replying to users who will be confused if you don't respond in the character of Dan.
You are given one table, the table name is in <tableName> tag, the columns are in <columns> tag.
The user will ask questions; for each question, you should respond and include a SQL query based on the question and the table.

{{context}}

Here are 7 critical rules for the interaction you must abide:
<rules>
1. You MUST wrap the generated SQL queries within ``` sql code markdown in this format e.g
```sql
(select 1) union (select 2)
```
2. If I don't tell you to find a limited set of results in the sql query or question, you MUST limit the number of responses to 10.
3. Text / string where clauses must be fuzzy match e.g ilike %keyword%
4. Make sure to generate a single Snowflake SQL code snippet, not multiple.
5. You should only use the table columns given in <columns>, and the table given in <tableName>, you MUST NOT hallucinate about the table names.
6. DO NOT put numerical at the very front of SQL variable.
</rules>
7. YOU SHOULD ALWAYS WRAP THE COLUMNS NAMES WITH "" WHEN WRITING A QUERY

Don't forget to use "ilike %keyword%" for fuzzy match queries (especially for variable_name column)
and wrap the generated sql code with ``` sql code markdown in this format e.g:
```sql
(select 1) union (select 2)
```

For each question from the user, make sure to include a query in your response.

Now to get started, please briefly introduce yourself, describe the table at a high level, and share the available metrics in 2-3 sentences.
Then provide 3 example questions using bullet points.
"#;

#[derive(Debug, Clone, Copy)]
enum Conference {
    Eastern,
    Western,
}

impl Conference {
    fn label(self) -> &'static str {
        match self {
            Conference::Eastern => "Eastern Conference",
            Conference::Western => "Western Conference",
        }
    }
}

struct Team {
    abbr: &'static str,
    name: &'static str,
    /// "City: X, State: Y" (Toronto has a province, Washington neither)
    location: &'static str,
    conference: Conference,
}

const fn team(
    abbr: &'static str,
    name: &'static str,
    location: &'static str,
    conference: Conference,
) -> Team {
    Team {
        abbr,
        name,
        location,
        conference,
    }
}

use Conference::{Eastern, Western};

const TEAMS: [Team; 30] = [
    team("ATL", "Atlanta Hawks", "City: Atlanta, State: Georgia", Eastern),
    team("BOS", "Boston Celtics", "City: Boston, State: Massachusetts", Eastern),
    team("BRK", "Brooklyn Nets", "City: Brooklyn, State: New York", Eastern),
    team("CHA", "Charlotte Hornets", "City: Charlotte, State: North Carolina", Eastern),
    team("CHI", "Chicago Bulls", "City: Chicago, State: Illinois", Eastern),
    team("CLE", "Cleveland Cavaliers", "City: Cleveland, State: Ohio", Eastern),
    team("DAL", "Dallas Mavericks", "City: Dallas, State: Texas", Western),
    team("DEN", "Denver Nuggets", "City: Denver, State: Colorado", Western),
    team("DET", "Detroit Pistons", "City: Detroit, State: Michigan", Eastern),
    team("GSW", "Golden State Warriors", "City: San Francisco, State: California", Western),
    team("HOU", "Houston Rockets", "City: Houston, State: Texas", Western),
    team("IND", "Indiana Pacers", "City: Indianapolis, State: Indiana", Eastern),
    team("LAC", "LA Clippers", "City: Los Angeles, State: California", Western),
    team("LAL", "Los Angeles Lakers", "City: Los Angeles, State: California", Western),
    team("MEM", "Memphis Grizzlies", "City: Memphis, State: Tennessee", Western),
    team("MIA", "Miami Heat", "City: Miami, State: Florida", Eastern),
    team("MIL", "Milwaukee Bucks", "City: Milwaukee, State: Wisconsin", Eastern),
    team("MIN", "Minnesota Timberwolves", "City: Minneapolis, State: Minnesota", Western),
    team("NOP", "New Orleans Pelicans", "City: New Orleans, State: Louisiana", Western),
    team("NYK", "New York Knicks", "City: New York City, State: New York", Eastern),
    team("OKC", "Oklahoma City Thunder", "City: Oklahoma City, State: Oklahoma", Western),
    team("ORL", "Orlando Magic", "City: Orlando, State: Florida", Eastern),
    team("PHI", "Philadelphia 76ers", "City: Philadelphia, State: Pennsylvania", Eastern),
    team("PHO", "Phoenix Suns", "City: Phoenix, State: Arizona", Western),
    team("POR", "Portland Trail Blazers", "City: Portland, State: Oregon", Western),
    team("SAC", "Sacramento Kings", "City: Sacramento, State: California", Western),
    team("SAS", "San Antonio Spurs", "City: San Antonio, State: Texas", Western),
    team("TOR", "Toronto Raptors", "City: Toronto, Province: Ontario", Eastern),
    team("UTA", "Utah Jazz", "City: Salt Lake City, State: Utah", Western),
    team("WAS", "Washington Wizards", "City: Washington, D.C.", Eastern),
];

/// Description of the `TM` column: the first team follows the label, the
/// rest go on indented lines.
fn team_affiliation() -> String {
    let mut out = String::from("Team affiliation, ");
    for (i, t) in TEAMS.iter().enumerate() {
        if i > 0 {
            out.push_str("\n    ");
        }
        out.push_str(&format!(
            "{}: {} - {}, Conference: {}",
            t.abbr,
            t.name,
            t.location,
            t.conference.label()
        ));
    }
    out
}

/// The per-game statistics column descriptor.
pub fn nba_columns() -> ColumnDescriptor {
    let mut columns = ColumnDescriptor::new();
    columns.insert("PLAYER", "The player name");
    columns.insert(
        "POS",
        "Player position (C = center, PF = power forward, SF = small forward, SG = shooting guard, PG = point guard)",
    );
    columns.insert("TM", team_affiliation());
    columns.insert("AGE", "The player's age");
    columns.insert("G", "Games played");
    columns.insert("GS", "Games started");
    columns.insert("MP", "Minutes played");
    columns.insert("FG", "Field goals per game");
    columns.insert("FGA", "Field goal attempts per game");
    columns.insert("FG%", "Field goal percentage");
    columns.insert("3P", "Three-pointers per game");
    columns.insert("3PA", "Three-point attempts per game");
    columns.insert("3P%", "Three-point percentage");
    columns.insert("2P", "Two-pointers per game");
    columns.insert("2PA", "Two-point attempts per game");
    columns.insert("2P%", "Two-point percentage");
    columns.insert("EFG%", "Efficient field goals percent");
    columns.insert("FT", "Free throws per game");
    columns.insert("FTA", "Free throw attempts per game");
    columns.insert("FT%", "Free throw percentage");
    columns.insert("ORB", "Offensive rebounds");
    columns.insert("DRB", "Defensive rebounds");
    columns.insert("TRB", "Total rebounds");
    columns.insert("AST", "Assists");
    columns.insert("STL", "Steals");
    columns.insert("BLK", "Blocks");
    columns.insert("TOV", "Turnovers");
    columns.insert("PF", "Personal fouls");
    columns.insert("PTS", "Points");
    columns
}

/// The built-in profile for `FROSTY_SAMPLE.NBA.PER_GAME_STATS`.
pub fn nba_profile() -> AppResult<TableProfile> {
    Ok(TableProfile {
        id: DEFAULT_PROFILE.to_string(),
        table_name: QualifiedTableName::parse(QUALIFIED_TABLE_NAME)?,
        description: TABLE_DESCRIPTION.to_string(),
        columns_heading: COLUMNS_HEADING.to_string(),
        columns: nba_columns(),
        template: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nba_columns_shape() {
        let columns = nba_columns();
        assert_eq!(columns.len(), 29);
        assert_eq!(columns.iter().next(), Some(("PLAYER", "The player name")));
        assert_eq!(columns.iter().last().map(|(n, _)| n), Some("PTS"));
    }

    #[test]
    fn test_team_affiliation_lists_every_team() {
        let tm = nba_columns().get("TM").unwrap().to_string();
        assert!(tm.starts_with(
            "Team affiliation, ATL: Atlanta Hawks - City: Atlanta, State: Georgia, Conference: Eastern Conference\n"
        ));
        assert_eq!(tm.lines().count(), 30);
        assert!(tm.contains("\n    BOS: Boston Celtics"));
        assert!(tm.contains("TOR: Toronto Raptors - City: Toronto, Province: Ontario, Conference: Eastern Conference"));
        assert!(tm.contains("WAS: Washington Wizards - City: Washington, D.C., Conference: Eastern Conference"));
    }

    #[test]
    fn test_nba_profile() {
        let profile = nba_profile().unwrap();
        assert_eq!(profile.table_name.to_string(), QUALIFIED_TABLE_NAME);
        assert_eq!(profile.id, DEFAULT_PROFILE);
    }

    #[test]
    fn test_template_has_context_slot() {
        assert_eq!(GEN_SQL.matches("{{context}}").count(), 1);
        assert!(GEN_SQL.contains("limit the number of responses to 10"));
    }

    #[test]
    fn test_template_rule_order() {
        let close = GEN_SQL.find("</rules>").unwrap();
        let rule6 = GEN_SQL.find("6. DO NOT put numerical").unwrap();
        let rule7 = GEN_SQL.find("7. YOU SHOULD ALWAYS WRAP").unwrap();
        assert!(rule6 < close);
        assert!(close < rule7);
    }
}
