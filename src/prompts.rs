//! Prompt composition.
//!
//! Three pure templating functions, one per language-model call in the
//! report flow. Keeping them side-effect-free makes the exact wording
//! testable without a model in the loop.

/// Ask for the top-5 ESG risks of an industry as a concise numbered list.
pub fn industry_risk_prompt(industry: &str) -> String {
    format!(
        "You are an expert ESG analyst. List the top 5 most common ESG violations or risks \
         for the '{}' industry. Be concise. Use a numbered list.",
        industry
    )
}

/// Instruct synthesis of industry risks, retrieved company context, and the
/// user's request into a structured compliance report.
///
/// The gap phrasing ("No specific information was found in the documents
/// regarding [Risk]") is fixed wording: the chart extractor and human readers
/// both rely on uncovered risks being flagged in this exact pattern. The
/// instruction not to invent company facts is prompt-level only — nothing
/// downstream can verify it.
pub fn report_prompt(industry_risks: &str, company_context: &str, user_question: &str) -> String {
    format!(
        r#"### Instruction:
You are an expert ESG (Environmental, Social, and Governance) consultant.
Your task is to generate a high-level compliance report based on the user's request.

You must synthesize information from THREE sources:
1.  **"Common Industry Risks"**: This is general knowledge about the company's industry.
2.  **"Company's Documents"**: This is the specific context retrieved from the company's internal PDFs.
3.  **"User's Request"**: The specific question the user wants you to answer.

---

### 1. Common Industry Risks (from your general knowledge):
{industry_risks}

---

### 2. Company's Documents (Internal RAG Context):
{company_context}

---

### 3. User's Request:
{user_question}

---

### Your Expert Compliance Report:
Based *only* on the information provided above, generate a structured report.

**CRITICAL TASK:**
1.  First, clearly list the **"Common Industry Risks"**.
2.  For each risk, analyze the **"Company's Documents"** to find evidence of how the company is addressing that specific risk.
3.  **Identify and highlight the gaps.** If the company's documents do not mention a policy for a common industry risk, you MUST state that "No specific information was found in the documents regarding [Risk]."
4.  Conclude with a "Recommendations" section, suggesting the company develop policies for the identified gaps.
5.  **Do not** make up information about the company. Stick strictly to the provided document context.

**Report:**
"#
    )
}

/// Instruct extraction of (risk, score) pairs from a report as bare JSON.
pub fn chart_extraction_prompt(report_text: &str) -> String {
    format!(
        r#"You are a data visualization analyst. Your task is to read the following ESG compliance report and extract the key risks and their compliance levels.
Assign a "Compliance Score" from 0 (No policy mentioned) to 100 (Excellent, comprehensive policy found).

**RULES:**
1.  Identify the main ESG risks discussed (e.g., "Data Privacy", "E-Waste", "Supply Chain Labor").
2.  For each risk, read the analysis and assign a "Compliance Score".
3.  You MUST output *only* a valid JSON list of objects. Do not add any text before or after the JSON.

**Example Output:**
[
  {{"risk": "Data Privacy", "score": 75}},
  {{"risk": "E-Waste Management", "score": 20}},
  {{"risk": "Supply Chain Labor", "score": 0}}
]

**Report to Analyze:**
{report_text}

**Your JSON Output:**
"#
    )
}
