// LLM prompt constants for text analysis.
// Reuses the cross-cutting JSON-only fragment from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// System prompt for free-text personality analysis.
pub const ANALYSIS_SYSTEM: &str = JSON_ONLY_SYSTEM;

/// Analysis prompt template. Replace `{archetypes}`, `{scores}` and
/// `{free_text}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are an expert in natural language processing and personality psychology.
A personality test has already computed Big Five scores (Openness, Conscientiousness,
Extraversion, Agreeableness, Neuroticism) on a 1-5 scale from multiple-choice answers.
You now receive the participant's open-ended answers and interests.

Analyze the text and produce:
1. Extracted keywords: important nouns and themes that appear in the text.
2. Updated Big Five scores: adjust the initial scores only where the text gives evidence.
   Every score MUST stay between 1 and 5.
3. The 2 best-matching personality types, chosen ONLY from this list:
{archetypes}
4. A personal comment of 3-5 sentences summarizing character, talents and tendencies,
   referencing the participant's own words where possible.
5. At least 5 course recommendations across diverse domains.
6. 3-5 career recommendations relevant to both the scores and the text.

Return a JSON object with this EXACT schema (no extra fields):
{
  "keywords": ["creativity", "art", "leadership"],
  "updated_scores": {
    "Openness": 4.8,
    "Conscientiousness": 3.2,
    "Extraversion": 4.5,
    "Agreeableness": 4.0,
    "Neuroticism": 2.1
  },
  "matched_archetypes": [
    {"name": "Innovative Explorer", "reason": "Curious about new ideas and enjoys creating."},
    {"name": "Social Leader", "reason": "Likes communicating with and guiding people."}
  ],
  "narrative_comment": "Your answers show ...",
  "career_recommendations": ["Product Designer", "Advertising Creative", "Community Leader"],
  "course_recommendations": ["Creative Thinking Techniques", "Leadership and Effective Communication", "Entrepreneurship 101", "Mindfulness and Stress Management", "Data Analysis Fundamentals"]
}

Initial scores computed from the test:
{scores}

Participant's open-ended answers:
{free_text}
"#;
