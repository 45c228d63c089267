//! Prompt templates sent to the LLM.
//!
//! Centralising every prompt here keeps the wording reviewable in one place
//! and lets unit tests inspect prompts without a live model. Both builders
//! are pure: no I/O, no state.

/// Instruction block for the executive summary.
///
/// Seven fixed topics, one `- Label: value` line each. The renderer relies on
/// that line shape to bold the label.
pub const SUMMARY_INSTRUCTIONS: &str = r#"Eres un asistente experto en contratación administrativa. Basado en el texto proporcionado,
genera un resumen conciso que incluya: Objeto, Plazo y prórrogas, Presupuesto,
Plazo de entrega, Vigencia de la oferta, Plazo de adjudicación y Multas/Cláusula Penal.
Cada punto debe estar en una nueva línea, comenzando con un guion. Ejemplo: "- Objeto: Compra de equipo.""#;

/// Response contract for a single requirement.
///
/// The parser in [`crate::pipeline::parse`] reads exactly these four keys.
pub const REQUIREMENT_RESPONSE_FORMAT: &str = r#"**Instrucciones:** Responde EXCLUSIVAMENTE con un objeto JSON con la siguiente estructura:
{
    "encontrado": "Sí" o "No",
    "archivo": "Nombre del archivo donde se encontró la información",
    "clausula": "Nombre exacto de la cláusula o sección",
    "texto_relevante": "Cita textual que cumple con el requisito."
}
Si no encuentras información relevante para un campo, responde con un valor null."#;

/// Build the executive-summary prompt over the consolidated text.
pub fn build_summary_prompt(consolidated_text: &str) -> String {
    format!(
        "{SUMMARY_INSTRUCTIONS}\n\n\
         **Texto completo:**\n\
         --- INICIO TEXTO ---\n\
         {consolidated_text}\n\
         --- FIN TEXTO ---\n"
    )
}

/// Build the prompt asking whether one checklist requirement is satisfied.
pub fn build_requirement_prompt(
    requirement: &str,
    consolidated_text: &str,
    filename1: &str,
    filename2: &str,
) -> String {
    format!(
        "Eres un asistente experto en la revisión de pliegos de condiciones de contratación administrativa en Costa Rica.\n\
         Tu tarea es analizar el texto de dos documentos para verificar un requisito.\n\
         Los documentos son '{filename1}' y '{filename2}'.\n\n\
         **Requisito a verificar:** \"{requirement}\"\n\n\
         **Texto completo:**\n\
         --- INICIO TEXTO ---\n\
         {consolidated_text}\n\
         --- FIN TEXTO ---\n\n\
         {REQUIREMENT_RESPONSE_FORMAT}\n"
    )
}

/// Wrap both documents' text in filename markers.
pub fn consolidate(filename1: &str, text1: &str, filename2: &str, text2: &str) -> String {
    format!(
        "--- INICIO: {filename1} ---\n{text1}\n--- FIN: {filename1} ---\n\n\
         --- INICIO: {filename2} ---\n{text2}\n--- FIN: {filename2} ---"
    )
}
