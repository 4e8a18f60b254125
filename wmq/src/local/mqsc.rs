//! A subset of the MQSC command language
//!
//! Supports `DEFINE`, `ALTER`, `DELETE`, `CLEAR` and `DISPLAY` on `QLOCAL`,
//! `QMODEL` and `QUEUE` objects, and `PING QMGR`. Every command produces
//! response texts in the format of the command server, failures included.

use std::{iter::Peekable, str::Chars};

use wmq_types::{
    constants::{MqLong, MQPER_NOT_PERSISTENT, MQPER_PERSISTENT},
    ReasonCode,
};

use super::{
    queue::{matches_generic, DefinitionType, QueueDefinition, QueueType},
    State,
};

const SYNTAX_ERROR: &str =
    "AMQ8405E: Syntax error detected at or near end of command segment below:-";

/// A keyword with an optional parenthesized value
#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    keyword: String,
    value: Option<String>,
}

impl Token {
    fn flag(&self) -> Option<&str> {
        match self.value {
            None => Some(self.keyword.as_str()),
            Some(_) => None,
        }
    }
}

#[derive(Debug)]
enum Failure {
    Syntax,
    Reason(ReasonCode, String),
}

impl From<()> for Failure {
    fn from(_: ()) -> Self {
        Failure::Syntax
    }
}

/// Runs one command and returns its response texts
pub(super) fn run(state: &mut State, text: &str) -> Vec<String> {
    match execute(state, text) {
        Ok(responses) => responses,
        Err(Failure::Syntax) => vec![format!("{}\n{}", SYNTAX_ERROR, text.trim())],
        Err(Failure::Reason(reason, name)) => vec![describe(reason, &name)],
    }
}

fn describe(reason: ReasonCode, name: &str) -> String {
    match reason {
        ReasonCode::UNKNOWN_OBJECT_NAME => {
            format!("AMQ8147E: WebSphere MQ object {} not found.", name)
        }
        ReasonCode::OBJECT_ALREADY_EXISTS => {
            "AMQ8150E: WebSphere MQ object already exists.".to_string()
        }
        ReasonCode::Q_NOT_EMPTY => format!("AMQ8143E: WebSphere MQ queue {} not empty.", name),
        ReasonCode::OBJECT_IN_USE => "AMQ8148E: WebSphere MQ object in use.".to_string(),
        ReasonCode::Q_TYPE_ERROR => "AMQ8151E: WebSphere MQ object has different type.".to_string(),
        reason => format!(
            "AMQ8101E: WebSphere MQ error ({:X}) has occurred.",
            reason.as_raw()
        ),
    }
}

fn execute(state: &mut State, text: &str) -> Result<Vec<String>, Failure> {
    let tokens = tokenize(text)?;
    let (verb, rest) = tokens.split_first().ok_or(Failure::Syntax)?;
    if verb.value.is_some() {
        return Err(Failure::Syntax);
    }

    if verb.keyword == "PING" {
        return match rest {
            [object] if object.flag() == Some("QMGR") => {
                Ok(vec!["AMQ8415I: Ping WebSphere MQ Queue Manager command complete.".to_string()])
            }
            _ => Err(Failure::Syntax),
        };
    }

    let (object, attributes) = rest.split_first().ok_or(Failure::Syntax)?;
    let q_type = match object.keyword.as_str() {
        "QLOCAL" | "QL" => Some(QueueType::Local),
        "QMODEL" | "QM" => Some(QueueType::Model),
        "QUEUE" | "Q" => None,
        _ => return Err(Failure::Syntax),
    };
    let name = object.value.clone().filter(|name| !name.is_empty()).ok_or(Failure::Syntax)?;
    let fail = |reason: ReasonCode| Failure::Reason(reason, name.clone());

    match verb.keyword.as_str() {
        "DEFINE" | "DEF" => {
            let mut definition = match q_type.ok_or(Failure::Syntax)? {
                QueueType::Local => QueueDefinition::local(name.clone()),
                QueueType::Model => {
                    QueueDefinition::model(name.clone(), DefinitionType::TemporaryDynamic)
                }
            };
            let mut replace = false;
            for token in attributes {
                match token.flag() {
                    Some("REPLACE") => replace = true,
                    Some("NOREPLACE") => replace = false,
                    _ => apply(&mut definition, token)?,
                }
            }
            state.define(definition, replace).map_err(fail)?;
            Ok(vec!["AMQ8006I: WebSphere MQ queue created.".to_string()])
        }
        "ALTER" | "ALT" => {
            let queue = state
                .queues
                .get(&name)
                .ok_or_else(|| fail(ReasonCode::UNKNOWN_OBJECT_NAME))?;
            let mut definition = queue.definition.clone();
            if q_type.map_or(false, |q_type| q_type != definition.q_type) {
                return Err(fail(ReasonCode::Q_TYPE_ERROR));
            }
            for token in attributes {
                apply(&mut definition, token)?;
            }
            state.define(definition, true).map_err(fail)?;
            Ok(vec!["AMQ8008I: WebSphere MQ queue changed.".to_string()])
        }
        "DELETE" | "DEL" => {
            let mut purge = false;
            for token in attributes {
                match token.flag() {
                    Some("PURGE") => purge = true,
                    Some("NOPURGE") => purge = false,
                    _ => return Err(Failure::Syntax),
                }
            }
            check_type(state, &name, q_type).map_err(fail)?;
            state.delete(&name, purge).map_err(fail)?;
            Ok(vec!["AMQ8007I: WebSphere MQ queue deleted.".to_string()])
        }
        "CLEAR" => {
            if !attributes.is_empty() {
                return Err(Failure::Syntax);
            }
            check_type(state, &name, q_type).map_err(fail)?;
            state.clear(&name).map_err(fail)?;
            Ok(vec!["AMQ8022I: WebSphere MQ queue cleared.".to_string()])
        }
        "DISPLAY" | "DIS" => {
            if attributes.iter().any(|token| token.value.is_some()) {
                return Err(Failure::Syntax);
            }
            let responses: Vec<String> = state
                .queues
                .values()
                .filter(|queue| q_type.map_or(true, |q_type| queue.definition.q_type == q_type))
                .filter(|queue| matches_generic(&name, &queue.definition.name))
                .map(|queue| display(&queue.definition, queue.depth()))
                .collect();
            if responses.is_empty() {
                return Err(fail(ReasonCode::UNKNOWN_OBJECT_NAME));
            }
            Ok(responses)
        }
        _ => Err(Failure::Syntax),
    }
}

fn check_type(state: &State, name: &str, q_type: Option<QueueType>) -> Result<(), ReasonCode> {
    match (state.queues.get(name), q_type) {
        (None, _) => Err(ReasonCode::UNKNOWN_OBJECT_NAME),
        (Some(queue), Some(q_type)) if queue.definition.q_type != q_type => {
            Err(ReasonCode::Q_TYPE_ERROR)
        }
        _ => Ok(()),
    }
}

fn display(definition: &QueueDefinition, depth: usize) -> String {
    let enabled = |inhibited: bool| if inhibited { "DISABLED" } else { "ENABLED" };
    [
        "AMQ8409I: Display Queue details.".to_string(),
        format!("   QUEUE({})", definition.name),
        format!("   TYPE({})", definition.q_type.mqsc_name()),
        format!("   DESCR({})", definition.description),
        format!("   CURDEPTH({})", depth),
        format!("   MAXDEPTH({})", definition.max_depth),
        format!("   MAXMSGL({})", definition.max_msg_length),
        format!("   GET({})", enabled(definition.inhibit_get)),
        format!("   PUT({})", enabled(definition.inhibit_put)),
        format!("   {}", if definition.shareable { "SHARE" } else { "NOSHARE" }),
        format!("   DEFTYPE({})", definition.definition_type.mqsc_name()),
    ]
    .join("\n")
}

fn apply(definition: &mut QueueDefinition, token: &Token) -> Result<(), Failure> {
    let value = token.value.as_deref();
    match (token.keyword.as_str(), value) {
        ("MAXDEPTH", Some(value)) => definition.max_depth = number(value, 0..=999_999_999)?,
        ("MAXMSGL", Some(value)) => definition.max_msg_length = number(value, 0..=104_857_600)?,
        ("DEFPRTY", Some(value)) => definition.default_priority = number(value, 0..=9)?,
        ("DESCR", Some(value)) => definition.description = value.to_string(),
        ("SHARE", None) => definition.shareable = true,
        ("NOSHARE", None) => definition.shareable = false,
        ("GET", Some(value)) => definition.inhibit_get = enabled(value)?,
        ("PUT", Some(value)) => definition.inhibit_put = enabled(value)?,
        ("DEFPSIST", Some("YES")) => definition.default_persistence = MQPER_PERSISTENT,
        ("DEFPSIST", Some("NO")) => definition.default_persistence = MQPER_NOT_PERSISTENT,
        ("DEFSOPT", Some("SHARED")) => definition.default_input_shared = true,
        ("DEFSOPT", Some("EXCL")) => definition.default_input_shared = false,
        ("DEFTYPE", Some(value)) if definition.q_type == QueueType::Model => {
            definition.definition_type = match value {
                "PERMDYN" => DefinitionType::PermanentDynamic,
                "TEMPDYN" => DefinitionType::TemporaryDynamic,
                _ => return Err(Failure::Syntax),
            }
        }
        _ => return Err(Failure::Syntax),
    }
    Ok(())
}

/// Whether the value inhibits the operation
fn enabled(value: &str) -> Result<bool, Failure> {
    match value {
        "ENABLED" => Ok(false),
        "DISABLED" => Ok(true),
        _ => Err(Failure::Syntax),
    }
}

fn number(value: &str, range: std::ops::RangeInclusive<MqLong>) -> Result<MqLong, Failure> {
    value
        .parse()
        .ok()
        .filter(|value| range.contains(value))
        .ok_or(Failure::Syntax)
}

/// Splits command text into keywords. Unquoted text is folded to upper case;
/// quoted values keep their case and use `''` for a quote.
fn tokenize(text: &str) -> Result<Vec<Token>, ()> {
    let mut chars = text.chars().peekable();
    let mut tokens = Vec::new();
    loop {
        skip_whitespace(&mut chars);
        let first = match chars.peek() {
            None => break,
            Some(c) => *c,
        };
        if !first.is_ascii_alphabetic() {
            return Err(());
        }
        let mut keyword = String::new();
        while let Some(c) = chars.peek().copied() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            keyword.push(c.to_ascii_uppercase());
            chars.next();
        }
        let value = match chars.peek() {
            Some('(') => {
                chars.next();
                Some(read_value(&mut chars)?)
            }
            Some(c) if !c.is_whitespace() => return Err(()),
            _ => None,
        };
        tokens.push(Token { keyword, value });
    }
    Ok(tokens)
}

fn read_value(chars: &mut Peekable<Chars<'_>>) -> Result<String, ()> {
    skip_whitespace(chars);
    let mut value = String::new();
    if chars.peek() == Some(&'\'') {
        chars.next();
        loop {
            match chars.next().ok_or(())? {
                '\'' if chars.peek() == Some(&'\'') => {
                    chars.next();
                    value.push('\'');
                }
                '\'' => break,
                c => value.push(c),
            }
        }
        skip_whitespace(chars);
        return match chars.next() {
            Some(')') => Ok(value),
            _ => Err(()),
        };
    }
    loop {
        match chars.next().ok_or(())? {
            ')' => return Ok(value.trim().to_ascii_uppercase()),
            '(' | '\'' => return Err(()),
            c => value.push(c),
        }
    }
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().map_or(false, |c| c.is_whitespace()) {
        chars.next();
    }
}

#[cfg(test)]
mod tests {
    use wmq_types::MessageDescriptor;

    use super::*;

    fn token(keyword: &str, value: Option<&str>) -> Token {
        Token {
            keyword: keyword.to_string(),
            value: value.map(str::to_string),
        }
    }

    #[test]
    fn tokenize_keywords_and_values() {
        let tokens = tokenize("def ql( app.in ) descr('It''s mine') noshare").unwrap();
        assert_eq!(
            tokens,
            vec![
                token("DEF", None),
                token("QL", Some("APP.IN")),
                token("DESCR", Some("It's mine")),
                token("NOSHARE", None),
            ]
        );
        assert!(tokenize("DEFINE QLOCAL(APP.IN").is_err());
        assert!(tokenize("DEFINE QLOCAL('APP.IN)").is_err());
        assert!(tokenize("DEFINE 'QLOCAL'").is_err());
    }

    #[test]
    fn define_and_display() {
        let mut state = State::default();
        let responses = run(&mut state, "DEFINE QLOCAL(APP.IN) MAXDEPTH(10) DESCR('Inbound')");
        assert_eq!(responses, vec!["AMQ8006I: WebSphere MQ queue created."]);
        let queue = &state.queues["APP.IN"];
        assert_eq!(queue.definition.max_depth, 10);
        assert_eq!(queue.definition.description, "Inbound");

        let responses = run(&mut state, "DEFINE QLOCAL(APP.IN)");
        assert_eq!(responses, vec!["AMQ8150E: WebSphere MQ object already exists."]);
        let responses = run(&mut state, "DEFINE QLOCAL(APP.IN) MAXDEPTH(20) REPLACE");
        assert_eq!(responses, vec!["AMQ8006I: WebSphere MQ queue created."]);
        assert_eq!(state.queues["APP.IN"].definition.max_depth, 20);

        let responses = run(&mut state, "DIS Q(APP.*)");
        assert_eq!(responses.len(), 1);
        assert!(responses[0].starts_with("AMQ8409I"));
        assert!(responses[0].contains("   QUEUE(APP.IN)"));
        assert!(responses[0].contains("   MAXDEPTH(20)"));

        let responses = run(&mut state, "DISPLAY QMODEL(APP.*)");
        assert_eq!(responses, vec!["AMQ8147E: WebSphere MQ object APP.* not found."]);
    }

    #[test]
    fn alter_model_definition_type() {
        let mut state = State::default();
        run(&mut state, "DEFINE QMODEL(APP.MODEL)");
        assert_eq!(
            state.queues["APP.MODEL"].definition.definition_type,
            DefinitionType::TemporaryDynamic
        );
        let responses = run(&mut state, "ALTER QMODEL(APP.MODEL) DEFTYPE(PERMDYN) PUT(DISABLED)");
        assert_eq!(responses, vec!["AMQ8008I: WebSphere MQ queue changed."]);
        let definition = &state.queues["APP.MODEL"].definition;
        assert_eq!(definition.definition_type, DefinitionType::PermanentDynamic);
        assert!(definition.inhibit_put);

        let responses = run(&mut state, "ALTER QLOCAL(APP.MODEL) MAXDEPTH(1)");
        assert_eq!(responses, vec!["AMQ8151E: WebSphere MQ object has different type."]);
    }

    #[test]
    fn delete_and_clear() {
        let mut state = State::default();
        run(&mut state, "DEFINE QLOCAL(APP.IN)");
        state
            .enqueue("APP.IN", &MessageDescriptor::default(), b"x", None)
            .unwrap();

        let responses = run(&mut state, "DELETE QLOCAL(APP.IN)");
        assert_eq!(responses, vec!["AMQ8143E: WebSphere MQ queue APP.IN not empty."]);
        let responses = run(&mut state, "CLEAR QLOCAL(APP.IN)");
        assert_eq!(responses, vec!["AMQ8022I: WebSphere MQ queue cleared."]);
        let responses = run(&mut state, "DELETE QLOCAL(APP.IN)");
        assert_eq!(responses, vec!["AMQ8007I: WebSphere MQ queue deleted."]);
        let responses = run(&mut state, "DELETE QLOCAL(APP.IN) PURGE");
        assert_eq!(responses, vec!["AMQ8147E: WebSphere MQ object APP.IN not found."]);
    }

    #[test]
    fn syntax_errors_and_ping() {
        let mut state = State::default();
        let responses = run(&mut state, "DEFINE QLOCAL(APP.IN) MAXDEPTH(lots)");
        assert_eq!(
            responses,
            vec![format!("{}\nDEFINE QLOCAL(APP.IN) MAXDEPTH(lots)", SYNTAX_ERROR)]
        );
        assert!(state.queues.is_empty());
        assert_eq!(run(&mut state, "START CHANNEL(X)")[0].lines().next(), Some(SYNTAX_ERROR));
        assert_eq!(
            run(&mut state, "ping qmgr"),
            vec!["AMQ8415I: Ping WebSphere MQ Queue Manager command complete."]
        );
    }
}
