//! Shell Module
//!
//! A small line-oriented host for the CACHE classes. Each line is one command:
//!
//! ```text
//! IMPORT [CLASS...]          import classes (all when none are named)
//! NEW <var> <CLASS> [arg]    construct an object; arg defaults from Config
//! <var> <METHOD> [args...]   PUT, GET, CONTAINS, DELETE, CLEAR
//! <var> SIZ                  read the size property
//! <var> STATS                print the store's counters as JSON
//! HELP | QUIT
//! ```
//!
//! Bare integers become `INTEGR`, decimals `DUBBLE`, `YEZ`/`NO` `BOOL`,
//! `NOTHIN` itself, and anything else (or anything quoted) `STRIN`.

use std::collections::{BTreeSet, HashMap};
use std::io::{BufRead, Write};

use anyhow::{anyhow, bail, Context};
use tracing::{debug, info};

use crate::config::Config;
use crate::host::{ClassKind, ClassRegistry, StashObject, Value, SIZE_PROPERTY};

const HELP: &str = "\
IMPORT [CLASS...]          import CACHE classes
NEW <var> <CLASS> [arg]    construct MEMSTASH <capacity> or TIMESTASH <ttl_seconds>
<var> <METHOD> [args...]   PUT key value | GET key | CONTAINS key | DELETE key | CLEAR
<var> SIZ                  number of entries
<var> STATS                counters as JSON
QUIT                       leave the shell";

// == Reply ==
/// Result of one shell command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Text to print
    Output(String),
    /// Nothing to print
    Quiet,
    /// End the session
    Quit,
}

// == Token ==
#[derive(Debug, Clone, PartialEq)]
struct Token {
    text: String,
    quoted: bool,
}

/// Splits a line on whitespace, keeping double-quoted runs together.
fn tokenize(line: &str) -> anyhow::Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' {
            chars.next();
            let mut text = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some(escaped) => text.push(escaped),
                        None => bail!("unterminated escape in quoted argument"),
                    },
                    Some(other) => text.push(other),
                    None => bail!("unterminated quoted argument"),
                }
            }
            tokens.push(Token { text, quoted: true });
        } else {
            let mut text = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                text.push(c);
                chars.next();
            }
            tokens.push(Token {
                text,
                quoted: false,
            });
        }
    }

    Ok(tokens)
}

/// Converts an argument token into a host value.
fn parse_value(token: &Token) -> Value {
    if token.quoted {
        return Value::from(token.text.clone());
    }
    match token.text.as_str() {
        "YEZ" => return Value::Bool(true),
        "NO" => return Value::Bool(false),
        "NOTHIN" => return Value::Nothin,
        _ => {}
    }
    if let Ok(n) = token.text.parse::<i64>() {
        return Value::Integer(n);
    }
    if token.text.contains('.') {
        if let Ok(d) = token.text.parse::<f64>() {
            return Value::Double(d);
        }
    }
    Value::from(token.text.clone())
}

// == Shell ==
/// Interpreter state: the registry, imported classes and named objects.
#[derive(Debug)]
pub struct Shell {
    registry: ClassRegistry,
    config: Config,
    imported: BTreeSet<ClassKind>,
    objects: HashMap<String, StashObject>,
}

impl Shell {
    pub fn new(registry: ClassRegistry, config: Config) -> Self {
        Self {
            registry,
            config,
            imported: BTreeSet::new(),
            objects: HashMap::new(),
        }
    }

    /// Returns the object bound to `name`, if any.
    pub fn object(&self, name: &str) -> Option<&StashObject> {
        self.objects.get(name)
    }

    // == Execute ==
    /// Runs a single command line.
    pub fn execute(&mut self, line: &str) -> anyhow::Result<Reply> {
        let tokens = tokenize(line)?;
        let Some((head, rest)) = tokens.split_first() else {
            return Ok(Reply::Quiet);
        };
        debug!(command = %head.text, args = rest.len(), "executing shell command");

        match head.text.to_uppercase().as_str() {
            "HELP" => Ok(Reply::Output(HELP.to_string())),
            "QUIT" | "EXIT" => Ok(Reply::Quit),
            "IMPORT" => self.import(rest),
            "NEW" => self.new_object(rest),
            _ => self.invoke(&head.text, rest),
        }
    }

    fn import(&mut self, names: &[Token]) -> anyhow::Result<Reply> {
        let names: Vec<&str> = names.iter().map(|t| t.text.as_str()).collect();
        let classes = self.registry.import(&names)?;

        let imported: Vec<&str> = classes.iter().map(|c| c.name).collect();
        self.imported.extend(classes.iter().map(|c| c.kind));
        Ok(Reply::Output(format!("imported {}", imported.join(", "))))
    }

    fn new_object(&mut self, args: &[Token]) -> anyhow::Result<Reply> {
        let [var, class, ctor_args @ ..] = args else {
            bail!("usage: NEW <var> <CLASS> [arg]");
        };

        let def = self
            .registry
            .class(&class.text)
            .ok_or_else(|| anyhow!("unknown CACHE class: {}", class.text))?;
        if !self.imported.contains(&def.kind) {
            bail!("class {} is not imported", def.name);
        }

        let mut values: Vec<Value> = ctor_args.iter().map(parse_value).collect();
        if values.is_empty() {
            match def.kind {
                ClassKind::MemStash => values.push(Value::Integer(self.config.default_capacity)),
                ClassKind::TimeStash => values.push(Value::Integer(self.config.default_ttl)),
                ClassKind::Stash => {}
            }
        }

        let name = def.name;
        let object = self
            .registry
            .instantiate(name, &values)
            .with_context(|| format!("cannot construct {}", name))?;
        self.objects.insert(var.text.clone(), object);
        Ok(Reply::Output(format!("{} = {}", var.text, name)))
    }

    fn invoke(&self, var: &str, rest: &[Token]) -> anyhow::Result<Reply> {
        let object = self
            .objects
            .get(var)
            .ok_or_else(|| anyhow!("unknown command or variable: {}", var))?;
        let Some((member, args)) = rest.split_first() else {
            bail!("usage: {} <METHOD> [args...]", var);
        };

        let member = member.text.to_uppercase();
        if member == SIZE_PROPERTY {
            return Ok(Reply::Output(object.property(&member)?.to_string()));
        }
        if member == "STATS" {
            let stats = object.stats()?;
            return Ok(Reply::Output(serde_json::to_string(&stats)?));
        }

        let values: Vec<Value> = args.iter().map(parse_value).collect();
        match object.call(&member, &values)? {
            Value::Nothin if member != "GET" => Ok(Reply::Quiet),
            value => Ok(Reply::Output(value.to_string())),
        }
    }

    // == Run ==
    /// Reads commands from `input` until end of input or QUIT.
    ///
    /// Command errors are written to `output` and do not end the session.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        mut output: W,
        interactive: bool,
    ) -> anyhow::Result<()> {
        info!("shell session started");
        let mut lines = input.lines();

        loop {
            if interactive {
                write!(output, "{}", self.config.prompt)?;
                output.flush()?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            let line = line.context("failed to read command")?;

            match self.execute(&line) {
                Ok(Reply::Output(text)) => writeln!(output, "{}", text)?,
                Ok(Reply::Quiet) => {}
                Ok(Reply::Quit) => break,
                Err(err) => writeln!(output, "error: {:#}", err)?,
            }
        }

        info!(objects = self.objects.len(), "shell session ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> Shell {
        Shell::new(ClassRegistry::new(), Config::default())
    }

    fn output(shell: &mut Shell, line: &str) -> String {
        match shell.execute(line).unwrap() {
            Reply::Output(text) => text,
            other => panic!("expected output for {:?}, got {:?}", line, other),
        }
    }

    #[test]
    fn test_tokenize_quotes() {
        let tokens = tokenize(r#"c PUT "two words" "say \"hi\"" 42"#).unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "PUT", "two words", "say \"hi\"", "42"]);
        assert!(tokens[2].quoted);
        assert!(!tokens[4].quoted);
        assert!(tokenize(r#"c PUT "open"#).is_err());
    }

    #[test]
    fn test_parse_value() {
        let bare = |s: &str| Token { text: s.to_string(), quoted: false };
        assert_eq!(parse_value(&bare("42")), Value::Integer(42));
        assert_eq!(parse_value(&bare("-1")), Value::Integer(-1));
        assert_eq!(parse_value(&bare("1.5")), Value::Double(1.5));
        assert_eq!(parse_value(&bare("YEZ")), Value::Bool(true));
        assert_eq!(parse_value(&bare("NOTHIN")), Value::Nothin);
        assert_eq!(parse_value(&bare("abc")), Value::from("abc"));
        let quoted = Token { text: "42".to_string(), quoted: true };
        assert_eq!(parse_value(&quoted), Value::from("42"));
    }

    #[test]
    fn test_new_requires_import() {
        let mut shell = shell();
        let err = shell.execute("NEW c MEMSTASH 2").unwrap_err();
        assert_eq!(err.to_string(), "class MEMSTASH is not imported");

        assert_eq!(output(&mut shell, "IMPORT memstash"), "imported MEMSTASH");
        assert_eq!(output(&mut shell, "NEW c MEMSTASH 2"), "c = MEMSTASH");
        assert!(shell.execute("NEW t TIMESTASH 5").is_err());
    }

    #[test]
    fn test_lru_session() {
        let mut shell = shell();
        output(&mut shell, "IMPORT");
        output(&mut shell, "NEW c MEMSTASH 2");

        assert_eq!(shell.execute("c PUT a 1").unwrap(), Reply::Quiet);
        assert_eq!(shell.execute("c PUT b 2").unwrap(), Reply::Quiet);
        assert_eq!(output(&mut shell, "c GET a"), "1");
        shell.execute("c PUT c 3").unwrap();
        assert_eq!(output(&mut shell, "c CONTAINS b"), "NO");
        assert_eq!(output(&mut shell, "c CONTAINS a"), "YEZ");
        assert_eq!(output(&mut shell, "c SIZ"), "2");
        assert_eq!(output(&mut shell, "c GET b"), "NOTHIN");
        assert!(output(&mut shell, "c STATS").contains("\"evictions\":1"));
    }

    #[test]
    fn test_type_and_validation_errors() {
        let mut shell = shell();
        output(&mut shell, "IMPORT");

        let err = shell.execute("NEW c MEMSTASH 0").unwrap_err();
        assert_eq!(
            format!("{:#}", err),
            "cannot construct MEMSTASH: MEMSTASH capacity must be positive"
        );

        output(&mut shell, "NEW c MEMSTASH 2");
        let err = shell.execute("c PUT 1 x").unwrap_err();
        assert_eq!(err.to_string(), "PUT expects STRIN key, got INTEGR");
        assert!(shell.execute("c PUT \"1\" x").is_ok());
    }

    #[test]
    fn test_default_constructor_argument() {
        let mut shell = Shell::new(
            ClassRegistry::new(),
            Config {
                default_ttl: 7,
                ..Config::default()
            },
        );
        output(&mut shell, "IMPORT TIMESTASH");
        output(&mut shell, "NEW t TIMESTASH");
        assert_eq!(shell.object("t").unwrap().class(), ClassKind::TimeStash);
        assert_eq!(output(&mut shell, "t SIZ"), "0");
    }

    #[test]
    fn test_run_reports_errors_and_quits() {
        let mut shell = shell();
        let script = "IMPORT\nNEW c MEMSTASH 1\nc PUT k v\nc GET k\nbogus\nQUIT\nc GET k\n";
        let mut out = Vec::new();
        shell.run(script.as_bytes(), &mut out, false).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "imported MEMSTASH, STASH, TIMESTASH",
                "c = MEMSTASH",
                "v",
                "error: unknown command or variable: bogus",
            ]
        );
    }
}
