use anyhow::{anyhow, bail, Result};
use herald_commands::{CommandDescriptor, OptionKind, RawOption};
use serde_json::{Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    pub name: &'a str,
    pub args: &'a str,
}

/// Splits `/name rest...` into the bare command name and its argument text.
pub fn parse_command(input: &str) -> Option<ParsedCommand<'_>> {
    let trimmed = input.trim();
    let body = trimmed.strip_prefix('/')?;

    let mut parts = body.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    if name.is_empty() {
        return None;
    }
    let args = parts.next().map(str::trim).unwrap_or_default();
    Some(ParsedCommand { name, args })
}

/// Converts argument text into raw options for `descriptor`.
///
/// Tokens shaped `name:value` or `name=value` bind to the named option when
/// `name` is declared; every other token fills the next unfilled option in
/// declaration order.
pub fn parse_option_tokens(args: &str, descriptor: &CommandDescriptor) -> Result<Vec<RawOption>> {
    let tokens = shell_words::split(args)
        .map_err(|error| anyhow!("invalid arguments for /{}: {error}", descriptor.name))?;

    let mut options: Vec<RawOption> = Vec::new();
    let mut positional = Vec::new();
    for token in tokens {
        match split_named_token(&token, descriptor) {
            Some((name, raw)) => {
                if options.iter().any(|option| option.name == name) {
                    bail!("option `{name}` supplied more than once for /{}", descriptor.name);
                }
                let kind = option_kind(descriptor, name);
                options.push(RawOption::new(name, coerce_option_value(kind, raw)));
            }
            None => positional.push(token),
        }
    }

    let mut unfilled = descriptor
        .options
        .iter()
        .filter(|spec| !options.iter().any(|option| option.name == spec.name))
        .collect::<Vec<_>>()
        .into_iter();
    for token in positional {
        let Some(spec) = unfilled.next() else {
            bail!(
                "too many arguments for /{} (usage: {})",
                descriptor.name,
                descriptor.usage()
            );
        };
        options.push(RawOption::new(
            spec.name.clone(),
            coerce_option_value(Some(spec.kind), &token),
        ));
    }
    Ok(options)
}

fn split_named_token<'a>(
    token: &'a str,
    descriptor: &CommandDescriptor,
) -> Option<(&'a str, &'a str)> {
    let separator = token.find([':', '='])?;
    let (name, rest) = token.split_at(separator);
    let value = &rest[1..];
    descriptor
        .options
        .iter()
        .any(|spec| spec.name == name)
        .then_some((name, value))
}

fn option_kind(descriptor: &CommandDescriptor, name: &str) -> Option<OptionKind> {
    descriptor
        .options
        .iter()
        .find(|spec| spec.name == name)
        .map(|spec| spec.kind)
}

/// Shapes raw text the way the host platform would deliver it for `kind`.
pub fn coerce_option_value(kind: Option<OptionKind>, raw: &str) -> Value {
    match kind {
        Some(OptionKind::Boolean) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Value::Bool(true),
            "false" | "no" | "off" | "0" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        Some(OptionKind::Integer) => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        Some(OptionKind::Number) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        Some(OptionKind::User) | Some(OptionKind::Mentionable) => {
            Value::String(strip_user_mention(raw).to_string())
        }
        _ => Value::String(raw.to_string()),
    }
}

/// Accepts `<@id>`, `<@!id>`, or a bare id.
pub fn strip_user_mention(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(|id| id.strip_prefix('!').unwrap_or(id))
        .unwrap_or(trimmed)
}

pub fn unknown_command_message(command: &str, command_names: &[&str]) -> String {
    match suggest_command(command, command_names) {
        Some(suggestion) => format!(
            "unknown command: /{command}\ndid you mean /{suggestion}?\nrun herald --list-commands for command list"
        ),
        None => format!("unknown command: /{command}\nrun herald --list-commands for command list"),
    }
}

/// Suggests a registered name that extends `command`, or failing that the one
/// sharing the longest leading run (at least three characters).
fn suggest_command<'a>(command: &str, command_names: &[&'a str]) -> Option<&'a str> {
    if command.is_empty() {
        return None;
    }
    if let Some(extension) = command_names
        .iter()
        .copied()
        .find(|candidate| candidate.starts_with(command))
    {
        return Some(extension);
    }

    command_names
        .iter()
        .copied()
        .map(|candidate| (candidate, shared_prefix_len(command, candidate)))
        .filter(|(_, shared)| *shared >= 3)
        .fold(None, |best: Option<(&'a str, usize)>, (candidate, shared)| match best {
            Some((_, longest)) if longest >= shared => best,
            _ => Some((candidate, shared)),
        })
        .map(|(candidate, _)| candidate)
}

fn shared_prefix_len(left: &str, right: &str) -> usize {
    left.chars()
        .zip(right.chars())
        .take_while(|(a, b)| a == b)
        .count()
}
