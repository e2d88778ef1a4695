//! Compose draft: transient form state that must survive a failed send.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeField {
    To,
    Subject,
    Body,
}

/// Fields supplied when opening the form (reply flows prefill these);
/// everything else starts empty.
#[derive(Debug, Clone, Default)]
pub struct ComposeSeed {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposeForm {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub field: ComposeField,
}

impl ComposeForm {
    pub fn open(seed: ComposeSeed) -> Self {
        Self {
            to: seed.to.unwrap_or_default(),
            subject: seed.subject.unwrap_or_default(),
            body: seed.body.unwrap_or_default(),
            field: ComposeField::To,
        }
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            ComposeField::To => ComposeField::Subject,
            ComposeField::Subject => ComposeField::Body,
            ComposeField::Body => ComposeField::To,
        };
    }

    pub fn input(&mut self, c: char) {
        match self.field {
            ComposeField::To => self.to.push(c),
            ComposeField::Subject => self.subject.push(c),
            ComposeField::Body => self.body.push(c),
        }
    }

    pub fn backspace(&mut self) {
        let target = match self.field {
            ComposeField::To => &mut self.to,
            ComposeField::Subject => &mut self.subject,
            ComposeField::Body => &mut self.body,
        };
        target.pop();
    }

    /// Newlines only make sense in the body; Enter on To/Subject advances
    /// to the next field instead.
    pub fn newline_or_advance(&mut self) {
        if self.field == ComposeField::Body {
            self.body.push('\n');
        } else {
            self.next_field();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_merges_seed_with_empty_defaults() {
        let form = ComposeForm::open(ComposeSeed {
            to: Some("alice@example.com".to_string()),
            subject: Some("Re: Invoice".to_string()),
            body: None,
        });
        assert_eq!(form.to, "alice@example.com");
        assert_eq!(form.subject, "Re: Invoice");
        assert_eq!(form.body, "");
        assert_eq!(form.field, ComposeField::To);
    }

    #[test]
    fn input_goes_to_focused_field() {
        let mut form = ComposeForm::open(ComposeSeed::default());
        form.input('a');
        form.next_field();
        form.input('b');
        form.next_field();
        form.input('c');
        form.newline_or_advance();
        form.input('d');
        assert_eq!(form.to, "a");
        assert_eq!(form.subject, "b");
        assert_eq!(form.body, "c\nd");
    }

    #[test]
    fn enter_advances_on_header_fields() {
        let mut form = ComposeForm::open(ComposeSeed::default());
        form.newline_or_advance();
        assert_eq!(form.field, ComposeField::Subject);
        assert_eq!(form.to, "");
    }
}
