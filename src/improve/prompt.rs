//! Fixed prompts for the editing stages.

/// Style guide applied during the improvement pass: transliteration of Arabic
/// terms, number and unit formatting, and removal of spoken-language fillers.
pub const STYLE_GUIDE: &str = r#"Please format the following transcription according to these rules:

## Arabic and Non-English Words
1. **Basic Transliteration Rules:**
   - Italicize all Arabic/non-English words except those in common English usage (e.g., Allah, imam, Quran)
   - People's names and places are not italicized (e.g., Imam Bukhari, Makkah)
   - Italicize all book titles, whether English or Arabic (e.g., *Ṣaḥīḥ Bukhāri*)
   - Use macrons for long vowels: ā, ī, ū (no double vowels)
   - Do not end words with long vowels (e.g., Ḥanbali, Bukhari)
   - Always use lowercase for "al-" unless it starts a sentence or title
   - Words ending with ة should end with 'h' (e.g., sūrah, Abu Ḥanīfah)

2. **Special Characters:**
   - Use Unicode symbol 02bf (ʿ) for ع
   - Use Unicode symbol 02be (ʾ) for ء
   - Do not use hamzat al-waṣl for surah names and prayers (e.g., Sūrat al-Fātiḥah, ṣalāt al-Fajr)
   - Omit initial hamzah transliteration unless the word is between two words
   - Double letters for shaddah (e.g., شدّة becomes shaddah)

## Numbers and Units
- Write single-digit numbers as words
- Use numerals for numbers requiring hyphens (e.g., twenty-four)
- Include space between numbers and units (e.g., 75 km)
- No space with percentages (e.g., 75%)
- Write fractions as words (e.g., one fifth)
- Time format: digits with a.m./p.m. (e.g., 5:00 a.m.)

## Content Guidelines
- Omit colloquial expressions (e.g., "ya'ni", "like", "gonna")
- Replace informal phrases with formal alternatives (e.g., "so he goes" becomes "he said")
- Remove teaching fillers (e.g., "Does that make sense?", "Is that clear?")
- Use complete forms instead of contractions (e.g., "is not" instead of "isn't")
- For hadith references, transcribe as paraphrased in class
- Exclude jokes unless they illustrate a point
- Fix incomplete or trailing sentences for grammatical correctness while maintaining the original meaning

## Additional Notes
- Honorifics should use symbols only, not written forms
- If symbols cannot be used, use the following letter replacements:
  - Prophet (ﷺ): use 'r'
  - Allah (ﷻ): use 'I'
  - Male Companion (رضي الله عنه): use 't'
  - Omit all other honorifics if symbols unavailable

Keep the original Arabic text as is. Do not add any extra information or commentary. Only edit the provided text."#;

/// Prompt for the correction pass, carrying one window of each transcript
pub fn correction_prompt(original: &str, edited: &str) -> String {
    format!(
        "Compare the edited transcript with the original transcript and correct any errors or \
         unnecessary changes in the edited transcript. Make sure the edited transcript follows \
         the formatting rules and the changes are accurate.\n\n\
         Original Transcript:\n{original}\n\n\
         Edited Transcript:\n{edited}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correction_prompt_carries_both_windows() {
        let prompt = correction_prompt("he said subhanallah", "He said *Subḥānallāh*");
        assert!(prompt.contains("Original Transcript:\nhe said subhanallah"));
        assert!(prompt.contains("Edited Transcript:\nHe said *Subḥānallāh*"));
    }
}
