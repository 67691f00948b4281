//! Fixed prompt text sent to the model.

/// System instruction attached to every tutoring request.
#[must_use]
pub fn system_prompt(language: &str) -> String {
    format!(
        "You are an expert at understanding, analysing and making accessible the knowledge in academic papers.\n\
         You can explain academic papers broadly and in depth, give examples, explain principles and make the \
         material accessible and easy to understand.\n\
         Always answer directly, without introductions.\n\
         First write the title of the section the user asked about in its original language, followed by its \
         {language} translation in parentheses.\n\
         Then write the whole explanation clearly in {language}; technical terms with no direct translation stay \
         in the original language.\n\
         If the requested part of the paper contains a figure, diagram or any other visual object (a caption \
         starting with \"Figure i\", where i is its number), point the user to that figure in the original paper \
         and explain it briefly and clearly.\n\
         Answer in {language}, and format the text clearly using professional Markdown."
    )
}

/// Outline extraction request with the paper text embedded.
#[must_use]
pub fn outline_request(paper: &str) -> String {
    format!(
        r#"Analyze the academic paper structure and extract ALL section and subsection titles exactly as they appear.

Requirements:
- Sections are main headings (e.g: '1. Introduction', '2. Methodology')
- Subsections are sub-headings under each section (e.g: '2.1 Data Collection', '2.2 Analysis')
- Preserve original numbering and text formatting
- Include all hierarchical levels (e.g 2.3.1 if exists)

Example Response:
{{
    "sections": {{
        "Introduction": ["1.1 Background", "1.2 Research Questions"],
        "Methods": ["2.1 Participants", "2.2 Experimental Design", "2.2.1 Apparatus"],
        "Conclusion": []
    }}
}}

Paper Content:
{paper}"#
    )
}

/// Request to explain one located section.
#[must_use]
pub fn explain_request(section_text: &str, language: &str) -> String {
    format!("Please explain this section, in {language}: {section_text}")
}

/// Opening request covering the abstract and introduction.
#[must_use]
pub fn overview_request(language: &str) -> String {
    format!(
        "Look carefully at the paper and explain its ABSTRACT and INTRODUCTION clearly.\n\
         Write in {language}!\n\
         Write only the explanation, without any extra words.\n\
         Write in a comfortable, readable way."
    )
}
