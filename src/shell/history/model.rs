use std::fmt;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Entry {
    pub number: u64,
    pub command: String,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.number, self.command)
    }
}
