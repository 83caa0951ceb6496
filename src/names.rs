use tracing::debug;

// Organisational and generic words that never appear in a person's name.
const BLOCKED_WORDS: &[&str] = &[
    "company", "corporation", "corp", "inc", "ltd", "llc", "plc", "group", "holdings",
    "business", "collaborative", "women", "more", "future", "team", "leadership",
    "management", "board", "directors", "executive", "executives", "officer", "officers",
    "about", "contact", "careers", "news", "our", "meet", "partners", "solutions",
    "services", "global", "international", "diligent", "intel", "microsoft", "apple",
    "google", "amazon",
];

// Title and department vocabulary; a span made of these is a title fragment.
const TITLE_WORDS: &[&str] = &[
    "chief", "senior", "sr", "junior", "vice", "president", "director", "head", "managing",
    "chairman", "chairwoman", "chair", "chairperson", "founder", "co-founder", "cofounder",
    "principal", "general", "counsel", "secretary", "treasurer", "manager", "lead", "human",
    "resources", "sales", "marketing", "finance", "financial", "operations", "operating",
    "technology", "technical", "engineering", "product", "people", "legal", "strategy",
    "revenue", "compliance", "administrative", "ceo", "cfo", "cto", "coo", "cmo", "cio",
    "evp", "svp", "vp",
];

// Leading words that make a span a phrase rather than a name.
const FUNCTION_WORDS: &[&str] = &["the", "of", "and", "a", "an", "for", "with", "in", "to"];

const HONORIFICS: &[&str] = &["mr", "mrs", "ms", "dr", "prof"];

// Corroboration shortcut: a known first name skips the length check.
const COMMON_FIRST_NAMES: &[&str] = &[
    "aaron", "adam", "alan", "alexander", "andrew", "anthony", "arthur", "austin", "benjamin",
    "betty", "bobby", "brandon", "brian", "carl", "carol", "charles", "christopher", "daniel",
    "david", "deborah", "dennis", "donald", "donna", "dorothy", "douglas", "edie", "edward",
    "eric", "ethan", "eugene", "frank", "gary", "george", "gregory", "harold", "helen", "henry",
    "jack", "jacob", "jason", "jeffrey", "jennifer", "jeremy", "jerry", "joe", "john",
    "jonathan", "jose", "joseph", "joshua", "juan", "justin", "karen", "keith", "kenneth",
    "kevin", "kimberly", "kyle", "larry", "laura", "lawrence", "lisa", "louis", "maria",
    "mark", "mary", "matthew", "meghan", "michael", "michelle", "nancy", "nathan",
    "nicholas", "noah", "patrick", "paul", "peter", "philip", "ralph", "raymond", "richard",
    "robert", "roger", "ronald", "roy", "ruth", "ryan", "samuel", "sandra", "sarah", "scott",
    "sean", "sharon", "stephen", "steven", "thomas", "timothy", "tyler", "vaibhav", "wayne",
    "william", "zachary",
];

/// Heuristic classifier: is `text` plausibly a person's name?
///
/// False positives and negatives are expected; callers treat a rejection as
/// "not a candidate", never as an error.
pub fn is_plausible_name(text: &str) -> bool {
    let verdict = check(text);
    if let Err(reason) = verdict {
        debug!(name = text, reason, "name rejected");
        return false;
    }
    true
}

fn check(text: &str) -> Result<(), &'static str> {
    let trimmed = text.trim();
    if trimmed.chars().count() < 5 {
        return Err("too short");
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if words.len() < 2 || words.len() > 4 {
        return Err("token count");
    }

    for word in &words {
        if !is_name_token(word) {
            return Err("token shape");
        }
        let bare = word.trim_end_matches('.').to_lowercase();
        if BLOCKED_WORDS.contains(&bare.as_str()) {
            return Err("blocked word");
        }
        if TITLE_WORDS.contains(&bare.as_str()) {
            return Err("title word");
        }
    }

    let first = words[0].trim_end_matches('.').to_lowercase();
    if FUNCTION_WORDS.contains(&first.as_str()) {
        return Err("function word");
    }
    if HONORIFICS.contains(&first.as_str()) {
        return Err("honorific");
    }

    if COMMON_FIRST_NAMES.contains(&first.as_str()) {
        return Ok(());
    }

    let last = words[words.len() - 1];
    if words[0].chars().count() >= 3 && last.chars().count() >= 3 {
        Ok(())
    } else {
        Err("short first or last token")
    }
}

/// Uppercase initial, alphabetic body; hyphens and periods allowed after the first char.
fn is_name_token(word: &str) -> bool {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_uppercase() || word.chars().count() < 2 {
        return false;
    }
    let rest: Vec<char> = chars.collect();
    if rest.iter().any(|c| !(c.is_alphabetic() || *c == '-' || *c == '.')) {
        return false;
    }
    // "--" or "-." are not names.
    !word.contains("--") && !word.contains("-.") && !word.starts_with('-')
}

/// Loose shape test used to locate name spans inside markup before validation.
pub fn looks_like_name(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 50 {
        return false;
    }
    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if words.len() < 2 || words.len() > 4 {
        return false;
    }
    words
        .iter()
        .all(|w| w.chars().next().is_some_and(|c| c.is_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_generic_phrases() {
        assert!(!is_plausible_name("Business Collaborative"));
        assert!(!is_plausible_name("The Future"));
        assert!(!is_plausible_name("A B"));
        assert!(!is_plausible_name("Leadership Team"));
        assert!(!is_plausible_name("Acme Corporation"));
    }

    #[test]
    fn rejects_title_fragments() {
        assert!(!is_plausible_name("Senior Vice"));
        assert!(!is_plausible_name("Human Resources"));
        assert!(!is_plausible_name("Managing Director"));
        assert!(!is_plausible_name("Jane Chief"));
    }

    #[test]
    fn accepts_real_names() {
        assert!(is_plausible_name("Maria Gonzalez"));
        assert!(is_plausible_name("Jean-Luc Picard"));
        assert!(is_plausible_name("Mary Ann Smith"));
    }

    #[test]
    fn token_count_bounds() {
        assert!(!is_plausible_name("Madonna"));
        assert!(!is_plausible_name("Juan Carlos De La Vega"));
    }

    #[test]
    fn rejects_lowercase_and_digits() {
        assert!(!is_plausible_name("jane doe"));
        assert!(!is_plausible_name("Jane Doe2"));
        assert!(!is_plausible_name("Jane O'Neil"));
    }

    #[test]
    fn common_first_name_shortcut() {
        // "Li" is under three characters; the known first name carries it.
        assert!(is_plausible_name("Joe Li"));
        assert!(!is_plausible_name("Zed Li"));
    }

    #[test]
    fn rejects_honorifics() {
        assert!(!is_plausible_name("Mr. John Smith"));
        assert!(!is_plausible_name("Dr. Jane Doe"));
    }

    #[test]
    fn loose_shape() {
        assert!(looks_like_name("Jane Doe"));
        assert!(looks_like_name("Our Leadership"));
        assert!(!looks_like_name("Jane"));
        assert!(!looks_like_name("jane doe"));
    }
}
