use nom::bytes::complete::{take_till1, take_while};
use nom::IResult;

/// Characters that separate words. Nothing else is special to the lexer.
pub const DELIMITERS: &[char] = &[' ', '\t', '\n', '\r'];

fn is_delimiter(c: char) -> bool {
    DELIMITERS.contains(&c)
}

fn delimiters(input: &str) -> IResult<&str, &str> {
    take_while(is_delimiter)(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    take_till1(is_delimiter)(input)
}

/// Lazily splits a line into words. `None` marks the end of the line.
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let (rest, _) = delimiters(self.rest).ok()?;
        match word(rest) {
            Ok((rest, token)) => {
                self.rest = rest;
                Some(token)
            }
            Err(_) => {
                self.rest = rest;
                None
            }
        }
    }
}

pub fn lex(line: &str) -> Tokens<'_> {
    Tokens { rest: line }
}

pub fn tokenize(line: &str) -> Vec<&str> {
    let tokens: Vec<&str> = lex(line).collect();
    for (index, token) in tokens.iter().enumerate() {
        debug!("token {}: '{}'", index, token);
    }
    tokens
}
