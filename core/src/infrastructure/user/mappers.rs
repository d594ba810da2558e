use crate::domain::user::entities::{User, UserLine};
use crate::entity::{user_line, userfeatures};

// `lastname` and `musiconhold` are legacy NOT NULL columns: absence is
// stored as the empty string.
impl From<&userfeatures::Model> for User {
    fn from(model: &userfeatures::Model) -> Self {
        Self {
            id: model.id,
            uuid: model.uuid,
            tenant_uuid: model.tenant_uuid,
            firstname: model.firstname.clone(),
            lastname: (!model.lastname.is_empty()).then(|| model.lastname.clone()),
            caller_id: model.callerid.clone(),
            voicemail_id: model.voicemailid,
            music_on_hold: (!model.musiconhold.is_empty()).then(|| model.musiconhold.clone()),
            enabled: model.commented == 0,
        }
    }
}

impl From<userfeatures::Model> for User {
    fn from(model: userfeatures::Model) -> Self {
        Self::from(&model)
    }
}

impl From<&user_line::Model> for UserLine {
    fn from(model: &user_line::Model) -> Self {
        Self {
            user_id: model.user_id,
            line_id: model.line_id,
            main_user: model.main_user,
            main_line: model.main_line,
        }
    }
}

impl From<user_line::Model> for UserLine {
    fn from(model: user_line::Model) -> Self {
        Self::from(&model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_strings_become_none() {
        let model = userfeatures::Model {
            id: 7,
            firstname: "John".to_string(),
            lastname: String::new(),
            musiconhold: String::new(),
            ..Default::default()
        };
        let user = User::from(&model);
        assert_eq!(user.lastname, None);
        assert_eq!(user.music_on_hold, None);
        assert!(user.enabled);
    }
}
