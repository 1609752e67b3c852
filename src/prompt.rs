use thiserror::Error;

use crate::models::{PetDescriptor, ResponseFormat};

/// The single character separating response segments. The parser in the
/// pipeline has zero tolerance for deviation, so the prompt must be explicit
/// about the delimiter, the segment count and the segment order.
pub const DELIMITER: char = '|';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("descriptor is missing the '{0}' attribute referenced by the template")]
    MissingAttribute(&'static str),
}

/// Builds the instruction string sent to the text-generation service.
///
/// Pure function of its inputs; expects a normalized descriptor and does not
/// validate emptiness itself (that is the pipeline's job), but fails when the
/// format references an attribute the descriptor does not carry.
pub fn build_prompt(descriptor: &PetDescriptor, format: ResponseFormat) -> Result<String, PromptError> {
    let gender = match (format.requires_gender(), &descriptor.gender) {
        (true, Some(g)) => Some(g.as_str()),
        (true, None) => return Err(PromptError::MissingAttribute("gender")),
        (false, g) => g.as_deref(),
    };

    let subject = match gender {
        Some(g) => format!("{} {} {}", descriptor.color, g, descriptor.species),
        None => format!("{} {}", descriptor.color, descriptor.species),
    };

    let mut prompt = format!(
        "I need a creative and fitting name for my {subject}. \
         The name should be easy to call out and appropriate for the animal's appearance. \
         Consider the following aspects:\n\
         - The animal's color and type\n"
    );
    if let Some(g) = gender {
        prompt.push_str(&format!("- How well the name suits a {g} animal\n"));
    }
    prompt.push_str(
        "- Cultural references, mythology or pop culture that might be fun\n\
         - How the name sounds when called out\n",
    );
    if !descriptor.traits.is_empty() {
        prompt.push_str(&format!(
            "- The animal's personality: {}\n",
            descriptor.traits.join(", ")
        ));
    }

    prompt.push_str(&format_directive(format));
    Ok(prompt)
}

fn format_directive(format: ResponseFormat) -> String {
    match format {
        ResponseFormat::Basic => format!(
            "Respond with exactly 2 segments separated by the character '{d}', \
             in this order: the name, then a brief explanation of why you chose it. \
             For example: \"Shadow {d} This name reflects both the cat's dark color and mysterious nature\". \
             Do not use the '{d}' character anywhere else in your answer.",
            d = DELIMITER
        ),
        ResponseFormat::Rich => format!(
            "Respond with exactly 4 segments separated by the character '{d}', \
             in this order: the name, a brief explanation of why you chose it, \
             a fun fact related to the animal, and a cute nickname. \
             For example: \"Shadow {d} This name reflects both the cat's dark color and mysterious nature {d} \
             Black cats were revered in ancient Egypt {d} Shadie\". \
             Do not use the '{d}' character anywhere else in your answer.",
            d = DELIMITER
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn descriptor(gender: Option<&str>, traits: &[&str]) -> PetDescriptor {
        PetDescriptor {
            species: "cat".into(),
            color: "black".into(),
            gender: gender.map(|g| g.to_string()),
            traits: traits.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn rich_prompt_mandates_four_segments_and_embeds_attributes() {
        let prompt = build_prompt(&descriptor(Some("female"), &[]), ResponseFormat::Rich).unwrap();
        assert!(prompt.contains("black female cat"));
        assert!(prompt.contains("exactly 4 segments"));
        assert!(prompt.contains("separated by the character '|'"));
        // One worked example showing all four segments.
        assert!(prompt.contains("Black cats were revered in ancient Egypt | Shadie"));
    }

    #[test]
    fn basic_prompt_mandates_two_segments_and_needs_no_gender() {
        let prompt = build_prompt(&descriptor(None, &[]), ResponseFormat::Basic).unwrap();
        assert!(prompt.contains("black cat"));
        assert!(prompt.contains("exactly 2 segments"));
    }

    #[test]
    fn rich_prompt_without_gender_is_a_template_error() {
        let err = build_prompt(&descriptor(None, &[]), ResponseFormat::Rich).unwrap_err();
        assert_eq!(err, PromptError::MissingAttribute("gender"));
    }

    #[test]
    fn personality_traits_are_listed_when_supplied() {
        let prompt =
            build_prompt(&descriptor(Some("male"), &["playful", "lazy"]), ResponseFormat::Rich)
                .unwrap();
        assert!(prompt.contains("personality: playful, lazy"));
    }

    #[test]
    fn traits_are_omitted_when_absent() {
        let prompt = build_prompt(&descriptor(Some("male"), &[]), ResponseFormat::Rich).unwrap();
        assert!(!prompt.contains("personality"));
    }
}
