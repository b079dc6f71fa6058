/// A word produced by the lexer, classified by the role it plays in a line.
///
/// Operators are only recognized as whole words: `a|b` is a single word.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Token<'a> {
    Word(&'a str),
    Pipe,
    Input,
    Redirect,
    Append,
    Comment,
}

impl<'a> Token<'a> {
    pub fn classify(word: &'a str) -> Token<'a> {
        match word {
            "|" => Token::Pipe,
            "<" => Token::Input,
            ">" => Token::Redirect,
            ">>" => Token::Append,
            w if w.starts_with('#') => Token::Comment,
            w => Token::Word(w),
        }
    }

    /// The operator spelling, used in diagnostics.
    pub fn as_str(&self) -> &'a str {
        match *self {
            Token::Word(w) => w,
            Token::Pipe => "|",
            Token::Input => "<",
            Token::Redirect => ">",
            Token::Append => ">>",
            Token::Comment => "#",
        }
    }
}
