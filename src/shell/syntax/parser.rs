use super::ast::*;
use super::tokens::Token;
use super::ParseError;
use std::path::PathBuf;

/// Builds a pipeline from lexed words in a single left-to-right pass.
///
/// Redirections apply to the stage being built when they are seen; a later
/// redirection of the same kind replaces an earlier one. Stray pipes are kept
/// as stages with an empty argv so the failure surfaces when that stage runs.
pub fn parse(words: &[&str]) -> Result<Pipeline, ParseError> {
    let mut stages: Vec<Stage> = Vec::new();
    let mut current = Stage::default();
    let mut iter = words.iter().map(|w| Token::classify(w));
    let mut saw_content = false;

    while let Some(token) = iter.next() {
        match token {
            Token::Word(word) => {
                saw_content = true;
                current.argv.push(String::from(word));
            }
            Token::Input => {
                current.stdin = Some(operand(&mut iter, token)?);
                saw_content = true;
            }
            Token::Redirect | Token::Append => {
                let path = operand(&mut iter, token)?;
                current.stdout = Some(OutputSink {
                    path: path,
                    append: token == Token::Append,
                });
                saw_content = true;
            }
            Token::Pipe => {
                saw_content = true;
                current.pipes_forward = true;
                stages.push(current);
                current = Stage::default();
            }
            Token::Comment => break,
        }
    }

    if !saw_content {
        return Err(ParseError::Empty);
    }
    stages.push(current);
    for (index, stage) in stages.iter().enumerate() {
        debug!("stage {}: {:?}", index, stage);
    }
    Ok(Pipeline { stages: stages })
}

fn operand<'a, I>(iter: &mut I, operator: Token<'a>) -> Result<PathBuf, ParseError>
where
    I: Iterator<Item = Token<'a>>,
{
    match iter.next() {
        Some(next) => Ok(PathBuf::from(next.as_str())),
        None => Err(ParseError::MissingOperand(operator.as_str().to_owned())),
    }
}
