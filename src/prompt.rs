use crate::models::{AnalysisRequest, ContentPart, EncodedImagePayload};

/// Instruction block sent after the chart image.
pub const ANALYSIS_INSTRUCTIONS: &str = "Analyze this blood glucose curve. Please provide:

1. **Overall Summary**: A general assessment of the glycemic control shown in the chart.

2. **Observed Levels**:
   - Identify periods of hyperglycemia (high glucose)
   - Identify periods of hypoglycemia (low glucose)
   - Identify periods within the target range (usually 70-180 mg/dL)

3. **Patterns and Trends**:
   - Glycemic variability (stability vs. fluctuations)
   - Meal-related patterns (if visible)
   - Critical times of the day

4. **Recommendations**:
   - Suggestions to improve control
   - Possible adjustments to diet or medication (mention that these must be discussed with a doctor)
   - Priority focus areas

Please be specific and detailed in your analysis. Remember that this analysis is informational and does not replace the evaluation of a healthcare professional.";

/// Image first, then the fixed instructions.
pub fn build(payload: EncodedImagePayload) -> AnalysisRequest {
    let media_type = payload.media_type();
    AnalysisRequest::new(vec![
        ContentPart::Image { data: payload.data, media_type },
        ContentPart::Text { text: ANALYSIS_INSTRUCTIONS.to_string() },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn payload(data: &str) -> EncodedImagePayload {
        EncodedImagePayload { data: data.into(), subtype: "png".into() }
    }

    #[test]
    fn image_part_comes_first() {
        let request = build(payload("QUJD"));
        assert_eq!(
            request.parts(),
            &[
                ContentPart::Image { data: "QUJD".into(), media_type: "image/png".into() },
                ContentPart::Text { text: ANALYSIS_INSTRUCTIONS.into() },
            ]
        );
    }

    #[test]
    fn instructions_do_not_depend_on_image() {
        let a = build(payload("QUJD"));
        let b = build(payload("WFla"));
        assert_eq!(a.parts()[1], b.parts()[1]);
        assert_ne!(a.parts()[0], b.parts()[0]);
    }

    #[test]
    fn instructions_cover_required_sections_in_order() {
        let sections = [
            "Overall Summary",
            "70-180 mg/dL",
            "Meal-related patterns",
            "Critical times",
            "Recommendations",
            "doctor",
        ];
        let mut cursor = 0;
        for section in sections {
            let found = ANALYSIS_INSTRUCTIONS[cursor..]
                .find(section)
                .unwrap_or_else(|| panic!("missing {section}"));
            cursor += found;
        }
    }
}
