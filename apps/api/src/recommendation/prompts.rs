// All LLM prompt constants for the recommendation pipeline.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for a sub-agent. Replace `{agent_id}` before sending.
pub const SUB_AGENT_SYSTEM: &str = "You are a specialized credit card analyst ({agent_id}). \
    Your job is to analyze a batch of cards and select the top 50% most relevant ones for one user.";

/// Sub-agent filtering prompt.
/// Replace: {agent_id}, {card_count}, {target_count}, {user_line},
///          {student_instruction}, {exact_names_instruction}, {json_only_instruction}, {cards_json}
pub const SUB_AGENT_PROMPT_TEMPLATE: &str = r#"You are a credit card analyst ({agent_id}).
Analyze {card_count} cards and select the TOP 50% most relevant ones.

USER: {user_line}
{student_instruction}
{exact_names_instruction}

CARDS: {cards_json}

TASK: Select ~{target_count} best cards. {json_only_instruction}
Return a JSON array of objects with "name" and "reasoning" fields:
[
  {"name": "Card Name", "reasoning": "Brief explanation"},
  {"name": "Another Card", "reasoning": "Brief explanation"}
]"#;

/// Appended to the sub-agent prompt when the user describes themselves as a student.
pub const SUB_AGENT_STUDENT_INSTRUCTION: &str = r#"
IMPORTANT: The user is a STUDENT. Prioritize student-specific credit cards and cards designed for people with limited credit history. Look for:
- Student-focused cards
- Lower credit requirements
- No annual fees (preferred)
- Credit building features
- Educational benefits
"#;

/// System prompt for the final ranker.
pub const RANKER_SYSTEM: &str = "You are an expert credit card advisor with deep knowledge of \
    all available cards. Your job is to analyze a pre-filtered shortlist and select the best 3 \
    cards for each user based on their specific profile. Always return the exact card details \
    from the shortlist.";

/// Final ranking prompt.
/// Replace: {user_line}, {profile_summary}, {student_instruction},
///          {exact_names_instruction}, {card_count}, {cards_json}
pub const RANKER_PROMPT_TEMPLATE: &str = r#"You are a credit card expert. Select the BEST 3 cards for this user and return them in a structured format.

{exact_names_instruction}

USER: {user_line}
PROFILE: {profile_summary}
{student_instruction}
CARDS ({card_count} total): {cards_json}

TASK: Select exactly 3 cards ranked by suitability. For each card, return:
1. The exact card name
2. All the card details (Issuer, Annual Fee, Credit Score, Regular APR, Rewards, etc.)
3. Detailed reasoning for why this card was selected

Return the response in this exact format:
1. **Card Name**
   - **Issuer:** [Issuer]
   - **Annual Fee:** [Annual Fee]
   - **Credit Score:** [Credit Score]
   - **Regular APR:** [Regular APR]
   - **Rewards:** [Rewards]
   - **Sign-up Bonus:** [Sign-up Bonus]
   - **Target Audience:** [Target Audience]

   **Reasoning:** [Detailed explanation of why this card was selected]

2. **Card Name**
   [Same format as above]

3. **Card Name**
   [Same format as above]"#;

/// Appended to the ranker prompt for students. Stronger than the sub-agent version:
/// student cards, when present, must lead the ranking.
pub const RANKER_STUDENT_INSTRUCTION: &str = r#"
IMPORTANT: The user is a STUDENT. You MUST prioritize student-specific credit cards and cards designed for people with limited credit history.

STUDENT CARD CRITERIA:
- Prioritize cards specifically designed for students
- Look for cards with lower credit requirements
- Prefer cards with no annual fees
- Focus on cards with credit building features
- Avoid cards requiring excellent credit scores
- If student cards are present in the list, they MUST be ranked first
"#;

/// Shown when there is nothing to recommend.
pub const NO_MATCH_MESSAGE: &str = "I apologize, but I couldn't find any credit cards that match \
    your profile. Please try adjusting your criteria or contact a financial advisor for \
    personalized advice.";

pub const FALLBACK_INTRO: &str = "Based on your profile, here are my top recommendations:";

pub const FALLBACK_OUTRO: &str = "These cards are selected based on your credit profile, spending \
    habits, and goals. Please review the terms and conditions before applying.";
