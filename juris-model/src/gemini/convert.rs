//! Conversion between juris request/response types and the Gemini wire format.

use juris_core::{
    Content, ContextDocument, LlmRequest, LlmResponse, Part, Role, UsageMetadata,
};

use super::types::{
    FinishReason, GenerateContentRequest, GenerationConfig, GenerationResponse, WireContent,
    WirePart, WireTool,
};

pub fn part_to_wire(part: &Part) -> WirePart {
    match part {
        Part::Text(text) => WirePart { text: Some(text.clone()), ..Default::default() },
        Part::FunctionCall(call) => {
            WirePart { function_call: Some(call.clone()), ..Default::default() }
        }
        Part::FunctionResponse(response) => {
            WirePart { function_response: Some(response.clone()), ..Default::default() }
        }
    }
}

/// Thought parts are dropped; a part carrying nothing we understand yields `None`.
pub fn part_from_wire(part: &WirePart) -> Option<Part> {
    if part.thought == Some(true) {
        return None;
    }
    if let Some(call) = &part.function_call {
        return Some(Part::FunctionCall(call.clone()));
    }
    if let Some(response) = &part.function_response {
        return Some(Part::FunctionResponse(response.clone()));
    }
    part.text.as_ref().map(|t| Part::Text(t.clone()))
}

pub fn content_to_wire(content: &Content) -> WireContent {
    WireContent {
        role: Some(content.role.as_str().to_string()),
        parts: Some(content.parts.iter().map(part_to_wire).collect()),
    }
}

/// Render contextual documents as a numbered block appended to the system
/// instruction, keeping them apart from the transcript.
pub fn render_documents(documents: &[ContextDocument]) -> String {
    let mut out = String::from("Relevant legal passages:");
    for (i, doc) in documents.iter().enumerate() {
        out.push_str(&format!("\n\n[{}]", i + 1));
        if let Some(title) = &doc.title {
            out.push_str(&format!(" {title}"));
        }
        out.push('\n');
        out.push_str(&doc.text);
    }
    out
}

/// Build the `generateContent` body for a request.
///
/// Gemini rejects a `system` role inside `contents`, so system turns are folded
/// into the system instruction together with the rendered documents.
pub fn to_generate_request(request: &LlmRequest) -> GenerateContentRequest {
    let mut instruction_sections: Vec<String> = Vec::new();
    if let Some(instruction) = &request.system_instruction {
        instruction_sections.push(instruction.clone());
    }

    let mut contents = Vec::with_capacity(request.contents.len());
    for content in &request.contents {
        if content.role == Role::System {
            instruction_sections.push(content.text());
        } else {
            contents.push(content_to_wire(content));
        }
    }

    if !request.documents.is_empty() {
        instruction_sections.push(render_documents(&request.documents));
    }

    let system_instruction = (!instruction_sections.is_empty()).then(|| WireContent {
        role: None,
        parts: Some(vec![WirePart {
            text: Some(instruction_sections.join("\n\n")),
            ..Default::default()
        }]),
    });

    let tools = (!request.tools.is_empty())
        .then(|| vec![WireTool { function_declarations: request.tools.clone() }]);

    let generation_config = request.config.as_ref().map(|c| GenerationConfig {
        temperature: c.temperature,
        top_p: c.top_p,
        top_k: c.top_k,
        max_output_tokens: c.max_output_tokens,
    });

    GenerateContentRequest { contents, system_instruction, tools, generation_config }
}

pub fn from_generation_response(response: &GenerationResponse) -> LlmResponse {
    let candidate = response.candidates.first();

    let content = candidate.and_then(|c| c.content.parts.as_ref()).map(|parts| Content {
        role: Role::Model,
        parts: parts.iter().filter_map(part_from_wire).collect(),
    });

    let finish_reason = candidate.and_then(|c| c.finish_reason.as_ref()).map(|r| {
        match r {
            FinishReason::Stop => "STOP",
            FinishReason::MaxTokens => "MAX_TOKENS",
            FinishReason::Safety => "SAFETY",
            FinishReason::Recitation => "RECITATION",
            FinishReason::Other => "OTHER",
        }
        .to_string()
    });

    let finish_reason = finish_reason.or_else(|| {
        response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_ref())
            .map(|reason| format!("BLOCKED: {reason}"))
    });

    let usage_metadata = response.usage_metadata.as_ref().map(|u| UsageMetadata {
        prompt_token_count: u.prompt_token_count,
        candidates_token_count: u.candidates_token_count,
        total_token_count: u.total_token_count,
    });

    LlmResponse { content, finish_reason, usage_metadata }
}
