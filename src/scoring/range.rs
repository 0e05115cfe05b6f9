use anyhow::{bail, Context, Result};

/// Ages a points category applies to.
///
/// Written in a category's `ages` field and matched against an event's
/// age bound: the top of its age group, or the bottom for "& Over"
/// events. Accepted forms: `<=10`, `<9`, `>=15`, `>14`, `11-12` (both
/// ends included) and a single age such as `12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeRange {
    Under(u32),
    UpTo(u32),
    Over(u32),
    From(u32),
    Exactly(u32),
    Span { youngest: u32, oldest: u32 },
}

impl AgeRange {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        // Two-character operators first so "<=" is not read as "<"
        let operators: [(&str, fn(u32) -> AgeRange); 4] = [
            ("<=", AgeRange::UpTo),
            (">=", AgeRange::From),
            ("<", AgeRange::Under),
            (">", AgeRange::Over),
        ];
        for (op, build) in operators {
            if let Some(rest) = s.strip_prefix(op) {
                return Ok(build(parse_age(s, rest)?));
            }
        }

        match s.split_once('-') {
            Some((youngest, oldest)) => {
                let youngest = parse_age(s, youngest)?;
                let oldest = parse_age(s, oldest)?;
                if youngest > oldest {
                    bail!(
                        "ages: '{}' has youngest age {} above oldest age {}",
                        s,
                        youngest,
                        oldest
                    );
                }
                Ok(AgeRange::Span { youngest, oldest })
            }
            None => Ok(AgeRange::Exactly(parse_age(s, s)?)),
        }
    }

    pub fn matches(&self, age: u32) -> bool {
        match *self {
            AgeRange::Under(n) => age < n,
            AgeRange::UpTo(n) => age <= n,
            AgeRange::Over(n) => age > n,
            AgeRange::From(n) => age >= n,
            AgeRange::Exactly(n) => age == n,
            AgeRange::Span { youngest, oldest } => (youngest..=oldest).contains(&age),
        }
    }
}

fn parse_age(range: &str, part: &str) -> Result<u32> {
    let part = part.trim();
    part.parse()
        .with_context(|| format!("ages: '{}' is not an age range ('{}' is not a whole age)", range, part))
}
