use crate::model::{EntityId, FormatType, NewGroup, NewMatch, NewStage, NewTeam, NewTournament};

pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Keyboard-editable form. Fields are addressed by index; `text_mut` returns
/// `None` for selector fields, which are cycled by the owning view instead.
pub trait Form {
    fn labels(&self) -> &'static [&'static str];
    fn focus(&self) -> usize;
    fn set_focus(&mut self, idx: usize);
    fn text_mut(&mut self, idx: usize) -> Option<&mut String>;
    fn reset(&mut self);

    fn focus_next(&mut self) {
        let count = self.labels().len().max(1);
        self.set_focus((self.focus() + 1) % count);
    }

    fn focus_prev(&mut self) {
        let count = self.labels().len().max(1);
        self.set_focus((self.focus() + count - 1) % count);
    }

    fn focused_is_text(&mut self) -> bool {
        let idx = self.focus();
        self.text_mut(idx).is_some()
    }

    fn input_char(&mut self, c: char) {
        let idx = self.focus();
        if let Some(text) = self.text_mut(idx) {
            text.push(c);
        }
    }

    fn backspace(&mut self) {
        let idx = self.focus();
        if let Some(text) = self.text_mut(idx) {
            text.pop();
        }
    }
}

/// Forms whose submission needs nothing beyond their own fields.
pub trait Submit {
    type Body;

    /// `None` when a required field is blank; the caller then does nothing.
    fn submission(&self) -> Option<Self::Body>;
}

fn required(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Moves a selector through `options`; unset counts as the slot before the first option.
pub fn cycle_choice(
    current: Option<EntityId>,
    options: &[EntityId],
    forward: bool,
) -> Option<EntityId> {
    if options.is_empty() {
        return None;
    }
    let pos = current.and_then(|id| options.iter().position(|opt| *opt == id));
    let next = match (pos, forward) {
        (None, true) => 0,
        (None, false) => options.len() - 1,
        (Some(idx), true) => (idx + 1) % options.len(),
        (Some(idx), false) => (idx + options.len() - 1) % options.len(),
    };
    options.get(next).copied()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub token: String,
    pub focus: usize,
}

impl LoginForm {
    /// `(token, username)` when both are filled in.
    pub fn credentials(&self) -> Option<(String, String)> {
        Some((required(&self.token)?, required(&self.username)?))
    }
}

impl Form for LoginForm {
    fn labels(&self) -> &'static [&'static str] {
        &["Username", "Token"]
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, idx: usize) {
        self.focus = idx;
    }

    fn text_mut(&mut self, idx: usize) -> Option<&mut String> {
        match idx {
            0 => Some(&mut self.username),
            1 => Some(&mut self.token),
            _ => None,
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentForm {
    pub name: String,
    pub timezone: String,
    pub format: FormatType,
    pub focus: usize,
}

impl Default for TournamentForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            format: FormatType::default(),
            focus: 0,
        }
    }
}

impl Submit for TournamentForm {
    type Body = NewTournament;

    fn submission(&self) -> Option<NewTournament> {
        Some(NewTournament {
            name: required(&self.name)?,
            timezone: required(&self.timezone)?,
            format_type: self.format.label().to_string(),
        })
    }
}

impl TournamentForm {
    pub const FORMAT_FIELD: usize = 2;

    pub fn cycle_format(&mut self, forward: bool) {
        self.format = if forward {
            self.format.next()
        } else {
            self.format.prev()
        };
    }
}

impl Form for TournamentForm {
    fn labels(&self) -> &'static [&'static str] {
        &["Tournament name", "Timezone", "Format"]
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, idx: usize) {
        self.focus = idx;
    }

    fn text_mut(&mut self, idx: usize) -> Option<&mut String> {
        match idx {
            0 => Some(&mut self.name),
            1 => Some(&mut self.timezone),
            _ => None,
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageForm {
    pub name: String,
    /// Free-form stage type, e.g. "Group Stage". Left out of the body when blank.
    pub kind: String,
    pub focus: usize,
}

impl StageForm {
    pub fn submission(&self, tournament_id: EntityId) -> Option<NewStage> {
        Some(NewStage {
            tournament_id,
            name: required(&self.name)?,
            kind: required(&self.kind),
        })
    }
}

impl Form for StageForm {
    fn labels(&self) -> &'static [&'static str] {
        &["Stage name", "Type"]
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, idx: usize) {
        self.focus = idx;
    }

    fn text_mut(&mut self, idx: usize) -> Option<&mut String> {
        match idx {
            0 => Some(&mut self.name),
            1 => Some(&mut self.kind),
            _ => None,
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupForm {
    pub stage_id: Option<EntityId>,
    pub name: String,
    pub focus: usize,
}

impl GroupForm {
    pub const STAGE_FIELD: usize = 0;

    pub fn submission(&self) -> Option<NewGroup> {
        let name = required(&self.name)?;
        Some(NewGroup {
            stage_id: self.stage_id?,
            name,
        })
    }
}

impl Form for GroupForm {
    fn labels(&self) -> &'static [&'static str] {
        &["Stage", "Group name"]
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, idx: usize) {
        self.focus = idx;
    }

    fn text_mut(&mut self, idx: usize) -> Option<&mut String> {
        (idx == 1).then_some(&mut self.name)
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchForm {
    pub group_id: Option<EntityId>,
    pub name: String,
    pub focus: usize,
}

impl MatchForm {
    pub const GROUP_FIELD: usize = 0;

    pub fn submission(&self) -> Option<NewMatch> {
        let name = required(&self.name)?;
        Some(NewMatch {
            group_id: self.group_id?,
            name,
        })
    }
}

impl Form for MatchForm {
    fn labels(&self) -> &'static [&'static str] {
        &["Group", "Match name"]
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, idx: usize) {
        self.focus = idx;
    }

    fn text_mut(&mut self, idx: usize) -> Option<&mut String> {
        (idx == 1).then_some(&mut self.name)
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamForm {
    pub tag: String,
    pub name: String,
    pub country: String,
    pub focus: usize,
}

impl Submit for TeamForm {
    type Body = NewTeam;

    fn submission(&self) -> Option<NewTeam> {
        Some(NewTeam {
            tag: required(&self.tag)?,
            name: required(&self.name)?,
            country: required(&self.country),
        })
    }
}

impl Form for TeamForm {
    fn labels(&self) -> &'static [&'static str] {
        &["Tag", "Team name", "Country"]
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, idx: usize) {
        self.focus = idx;
    }

    fn text_mut(&mut self, idx: usize) -> Option<&mut String> {
        match idx {
            0 => Some(&mut self.tag),
            1 => Some(&mut self.name),
            2 => Some(&mut self.country),
            _ => None,
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_name_is_skipped() {
        let form = StageForm {
            name: "   ".to_string(),
            kind: "Group Stage".to_string(),
            ..StageForm::default()
        };
        assert_eq!(form.submission(42), None);
    }

    #[test]
    fn stage_submission_trims_name() {
        let form = StageForm {
            name: "  Finals ".to_string(),
            kind: "  ".to_string(),
            ..StageForm::default()
        };
        assert_eq!(
            form.submission(42),
            Some(NewStage {
                tournament_id: 42,
                name: "Finals".to_string(),
                kind: None,
            })
        );
    }

    #[test]
    fn stage_type_is_sent_as_type_only_when_filled() {
        let mut form = StageForm::default();
        form.input_char('F');
        form.focus_next();
        for c in " Playoffs ".chars() {
            form.input_char(c);
        }
        let body = serde_json::to_value(form.submission(42).unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"tournamentId": 42, "name": "F", "type": "Playoffs"})
        );

        form.kind.clear();
        let body = serde_json::to_value(form.submission(42).unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"tournamentId": 42, "name": "F"}));
    }

    #[test]
    fn group_needs_a_stage() {
        let mut form = GroupForm {
            name: "Group A".to_string(),
            ..GroupForm::default()
        };
        assert_eq!(form.submission(), None);
        form.stage_id = Some(7);
        assert_eq!(form.submission().map(|g| g.stage_id), Some(7));
    }

    #[test]
    fn tournament_form_defaults() {
        let form = TournamentForm::default();
        assert_eq!(form.timezone, "UTC");
        assert_eq!(form.format, FormatType::Squad);
        assert_eq!(form.submission(), None);
    }

    #[test]
    fn typing_only_reaches_text_fields() {
        let mut form = GroupForm::default();
        form.input_char('x');
        assert_eq!(form.name, "");
        form.focus_next();
        form.input_char('A');
        form.input_char('B');
        form.backspace();
        assert_eq!(form.name, "A");
        form.focus_next();
        assert_eq!(form.focus, GroupForm::STAGE_FIELD);
    }

    #[test]
    fn choice_cycles_through_options() {
        let opts = [3, 5, 8];
        assert_eq!(cycle_choice(None, &opts, true), Some(3));
        assert_eq!(cycle_choice(None, &opts, false), Some(8));
        assert_eq!(cycle_choice(Some(8), &opts, true), Some(3));
        assert_eq!(cycle_choice(Some(99), &opts, true), Some(3));
        assert_eq!(cycle_choice(Some(3), &[], true), None);
    }

    #[test]
    fn team_country_is_optional() {
        let form = TeamForm {
            tag: "VTX".to_string(),
            name: "Voltrix".to_string(),
            country: " ".to_string(),
            focus: 0,
        };
        let body = form.submission().unwrap();
        assert_eq!(body.country, None);
    }
}
