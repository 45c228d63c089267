//! The fixed procurement checklist.
//!
//! Wording and order are part of the report contract: rows appear in this
//! order and each label is shown verbatim in the "Requisito" column.

/// The 14 requirements verified on every run, in report order.
pub const CHECKLIST_ITEMS: [&str; 14] = [
    "Objeto Contractual",
    "Contenido presupuestario",
    "Garantía de cumplimiento",
    "Especies fiscales y timbres (específicamente el Timbre de la Asociación Ciudad de las Niñas)",
    "Términos de pago (Verificar si existe adelanto de pago)",
    "Vigencia de la oferta",
    "Plazo de adjudicación",
    "Plazo de entrega de los bienes o servicios",
    "Requisitos de admisibilidad",
    "Criterios de evaluación",
    "Cláusulas penales y de multas",
    "Vigencia del contrato y posibilidad de prórrogas",
    "Traducción de documentación técnica si es en idioma extranjero",
    "Apostillado de documentos públicos emitidos en el extranjero",
];
