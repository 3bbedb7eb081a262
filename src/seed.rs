use crate::models::{RecordKind, Snapshot};
use crate::parser::RecordParser;

pub const SEED_USERS: &str = "id,name,streakStartDate
1,John Doe,2023-10-01T12:00:00.000Z
2,Jane Smith,2023-10-25T08:30:00.000Z";

pub const SEED_RELAPSES: &str = "id,userId,date,trigger,situation,missedPlan,emotion,improvementPlan
101,1,2023-09-15T10:00:00.000Z,Stress,Alone in room,Did not call friend,Guilt,Work in living room
102,1,2023-09-20T14:00:00.000Z,Boredom,Scrolling social media,No blocker,Empty,Install blocker";

pub const SEED_REPORTS: &str = "id,userId,reportDate,weekStartDate,totalRelapses,helpfulFactors,difficultFactors,warningSigns,emergencyPlanSuccess,focusNextWeek
201,1,2023-09-22T09:00:00.000Z,2023-09-15T00:00:00.000Z,2,Running,Loneliness,Boredom,Failed to exit room,Morning routine";

pub const SEED_CHECK_INS: &str = "id,userId,date,mood,urgeIntensity,notes
301,1,2023-10-02T20:00:00.000Z,Good,2,Had a productive day at work.
302,1,2023-10-03T21:00:00.000Z,Stressed,6,\"Arguments with boss, but used breathing techniques.\"";

/// Sample collections every fresh process starts from.
pub fn seed_snapshot(parser: &RecordParser) -> Snapshot {
    let blocks = [
        (RecordKind::Profile, SEED_USERS),
        (RecordKind::Relapse, SEED_RELAPSES),
        (RecordKind::WeeklyReport, SEED_REPORTS),
        (RecordKind::CheckIn, SEED_CHECK_INS),
    ];

    let mut snapshot = Snapshot::default();
    for (kind, text) in blocks {
        snapshot.extend(parser.parse_kind(kind, text));
    }
    snapshot
}
