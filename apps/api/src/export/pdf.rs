//! Renders a persisted snapshot document to PDF. The snapshot is consumed
//! read-only — everything here is presentation over already-resolved data.

use std::io::BufWriter;

use anyhow::anyhow;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rgb,
};

use crate::errors::AppError;
use crate::export::format::{
    format_display_date, normalize_skill_level, parse_hex_color, sanitize_filename,
    skill_level_rank, DEFAULT_ACCENT_COLOR,
};
use crate::profiles::snapshot::{ResolvedBlockData, ResolvedProject, SnapshotDocument};

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 18.0;
const CONTENT_WIDTH_MM: f64 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
const PT_TO_MM: f64 = 0.352_778;
/// Average glyph advance for builtin Helvetica, as a fraction of the font size.
const AVG_GLYPH_EM: f64 = 0.5;

const TEXT_PRIMARY: (f64, f64, f64) = (0.06, 0.09, 0.16);
const TEXT_MUTED: (f64, f64, f64) = (0.39, 0.45, 0.55);

#[derive(Clone, Copy)]
enum Font {
    Regular,
    Bold,
    Oblique,
}

/// Characters that fit on one line at the given size, by average advance.
fn max_chars_for(font_size_pt: f64) -> usize {
    (CONTENT_WIDTH_MM / (font_size_pt * AVG_GLYPH_EM * PT_TO_MM)).floor() as usize
}

/// Greedy word wrap by character count. Words longer than a line are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for raw_line in text.split('\n') {
        if raw_line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_len = 0usize;
        for word in raw_line.split_whitespace() {
            let word_len = word.chars().count();
            if word_len > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(max_chars) {
                    lines.push(chunk.iter().collect());
                }
                continue;
            }
            let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
            if needed > max_chars {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_len = word_len;
            } else {
                if !current.is_empty() {
                    current.push(' ');
                    current_len += 1;
                }
                current.push_str(word);
                current_len += word_len;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Cursor-based text layout over printpdf pages.
struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
    y_mm: f64,
}

impl PdfWriter {
    fn new(title: &str) -> anyhow::Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("{e}"))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("{e}"))?;
        let oblique = doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(|e| anyhow!("{e}"))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            oblique,
            y_mm: PAGE_HEIGHT_MM - MARGIN_MM,
        })
    }

    fn ensure_space(&mut self, needed_mm: f64) {
        if self.y_mm - needed_mm < MARGIN_MM {
            let (page, layer) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y_mm = PAGE_HEIGHT_MM - MARGIN_MM;
        }
    }

    fn line(&mut self, text: &str, size_pt: f64, font: Font, color: (f64, f64, f64)) {
        let line_mm = size_pt * 1.4 * PT_TO_MM;
        self.ensure_space(line_mm);
        self.y_mm -= line_mm;
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(color.0, color.1, color.2, None)));
        let font_ref = match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
            Font::Oblique => &self.oblique,
        };
        self.layer
            .use_text(text, size_pt, Mm(MARGIN_MM), Mm(self.y_mm), font_ref);
    }

    fn paragraph(&mut self, text: &str, size_pt: f64, font: Font, color: (f64, f64, f64)) {
        for line in wrap_text(text, max_chars_for(size_pt)) {
            self.line(&line, size_pt, font, color);
        }
    }

    fn spacer(&mut self, mm: f64) {
        self.y_mm -= mm;
    }

    fn finish(self) -> anyhow::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        {
            let mut writer = BufWriter::new(&mut bytes);
            self.doc.save(&mut writer).map_err(|e| anyhow!("{e}"))?;
        }
        Ok(bytes)
    }
}

pub struct ProfilePdfGenerator<'a> {
    document: &'a SnapshotDocument,
    company_name: Option<&'a str>,
    accent: (f64, f64, f64),
}

impl<'a> ProfilePdfGenerator<'a> {
    pub fn new(
        document: &'a SnapshotDocument,
        company_name: Option<&'a str>,
        accent_color: Option<&str>,
    ) -> Self {
        Self {
            document,
            company_name,
            accent: parse_hex_color(accent_color.unwrap_or(DEFAULT_ACCENT_COLOR)),
        }
    }

    pub fn generate(&self) -> anyhow::Result<Vec<u8>> {
        let consultant = &self.document.consultant;
        let mut pdf = PdfWriter::new(&format!("Profile - {}", consultant.first_name))?;

        self.add_header(&mut pdf);
        self.add_consultant_summary(&mut pdf);
        self.add_projects(&mut pdf);
        self.add_skills(&mut pdf);
        self.add_certifications(&mut pdf);
        self.add_misc(&mut pdf);

        pdf.finish()
    }

    fn brand_label(&self) -> String {
        self.company_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("areto group")
            .to_uppercase()
    }

    fn add_header(&self, pdf: &mut PdfWriter) {
        pdf.line(&self.brand_label(), 8.5, Font::Bold, TEXT_MUTED);
        pdf.line("Consultant Profile", 21.0, Font::Bold, self.accent);

        let generated = format_display_date(&self.document.generated_at.to_rfc3339())
            .map(|date| format!("Generated {date}"));
        if let Some(generated) = generated {
            pdf.line(&generated, 8.5, Font::Regular, TEXT_MUTED);
        }
        pdf.spacer(4.0);
    }

    fn add_section_header(&self, pdf: &mut PdfWriter, title: &str) {
        pdf.spacer(4.0);
        pdf.line(&title.to_uppercase(), 10.5, Font::Bold, self.accent);
        pdf.spacer(1.5);
    }

    fn add_consultant_summary(&self, pdf: &mut PdfWriter) {
        let consultant = &self.document.consultant;
        let general = &self.document.general_customizations;

        let name = format!("{} {}", consultant.first_name, consultant.last_name)
            .trim()
            .to_string();
        if !name.is_empty() {
            pdf.line(&name, 18.0, Font::Bold, TEXT_PRIMARY);
        }
        if !consultant.title.is_empty() {
            pdf.line(&consultant.title, 11.5, Font::Regular, self.accent);
        }
        pdf.spacer(2.0);

        if let Some(role) = &general.role {
            pdf.line(&format!("Role: {role}"), 9.5, Font::Regular, TEXT_PRIMARY);
        }
        if let Some(years) = general.years_experience {
            pdf.line(
                &format!("Experience: {years} years"),
                9.5,
                Font::Regular,
                TEXT_PRIMARY,
            );
        }
        if !consultant.email.is_empty() {
            pdf.line(
                &format!("Email: {}", consultant.email),
                9.5,
                Font::Regular,
                TEXT_PRIMARY,
            );
        }

        if !general.focus_areas.is_empty() {
            pdf.spacer(1.5);
            pdf.line("FOCUS AREAS", 8.5, Font::Bold, TEXT_MUTED);
            pdf.paragraph(
                &general.focus_areas.join("  -  "),
                9.5,
                Font::Regular,
                TEXT_PRIMARY,
            );
        }

        if let Some(motto) = &general.motto {
            pdf.spacer(1.5);
            pdf.paragraph(&format!("\"{motto}\""), 10.0, Font::Oblique, TEXT_PRIMARY);
        }
    }

    fn project_timeline(&self, project: &ResolvedProject) -> Option<String> {
        let start = project
            .start_date
            .and_then(|d| format_display_date(&d.to_string()));
        let end = if project.is_ongoing {
            Some("Present".to_string())
        } else {
            project
                .end_date
                .and_then(|d| format_display_date(&d.to_string()))
        };
        match (start, end) {
            (Some(start), Some(end)) => Some(format!("{start} - {end}")),
            (start, end) => start.or(end),
        }
    }

    fn add_projects(&self, pdf: &mut PdfWriter) {
        let projects = &self.document.blocks_by_type.project;
        if projects.is_empty() {
            return;
        }
        self.add_section_header(pdf, "Professional Experience");

        for block in projects {
            let ResolvedBlockData::Project(project) = &block.data else {
                continue;
            };

            pdf.line(
                block.title.as_deref().unwrap_or("Untitled Project"),
                11.5,
                Font::Bold,
                TEXT_PRIMARY,
            );

            let mut metadata = Vec::new();
            if let Some(client) = &project.client_name {
                metadata.push(format!("Client: {client}"));
            }
            if let Some(role) = &project.role {
                metadata.push(format!("Role: {role}"));
            }
            if let Some(timeline) = self.project_timeline(project) {
                metadata.push(format!("Timeline: {timeline}"));
            }
            if !metadata.is_empty() {
                pdf.paragraph(&metadata.join("  -  "), 9.0, Font::Regular, TEXT_MUTED);
            }

            if let Some(description) = &project.description {
                pdf.paragraph(description, 10.0, Font::Regular, TEXT_PRIMARY);
            }
            if !project.technologies.is_empty() {
                pdf.paragraph(
                    &format!("Technologies: {}", project.technologies.join(", ")),
                    9.5,
                    Font::Regular,
                    TEXT_MUTED,
                );
            }
            pdf.spacer(2.5);
        }
    }

    fn add_skills(&self, pdf: &mut PdfWriter) {
        let skills = &self.document.blocks_by_type.skill;
        if skills.is_empty() {
            return;
        }
        self.add_section_header(pdf, "Skills Overview");

        let mut entries: Vec<(String, &'static str)> = skills
            .iter()
            .map(|block| {
                let level = match &block.data {
                    ResolvedBlockData::Skill(skill) => normalize_skill_level(skill.level.as_deref()),
                    _ => normalize_skill_level(None),
                };
                let title = block
                    .title
                    .as_deref()
                    .map(str::trim)
                    .filter(|title| !title.is_empty())
                    .unwrap_or("Skill")
                    .to_string();
                (title, level)
            })
            .collect();
        entries.sort_by(|a, b| {
            (skill_level_rank(a.1), a.0.to_lowercase()).cmp(&(skill_level_rank(b.1), b.0.to_lowercase()))
        });

        let mut totals: [usize; 4] = [0; 4];
        for (_, level) in &entries {
            totals[skill_level_rank(level)] += 1;
        }
        let summary = format!(
            "{} skills  -  Expert {}  -  Advanced {}  -  Proficient {}  -  Basic {}",
            entries.len(),
            totals[0],
            totals[1],
            totals[2],
            totals[3]
        );
        pdf.line(&summary, 9.0, Font::Regular, TEXT_MUTED);
        pdf.spacer(1.5);

        for (title, level) in &entries {
            pdf.line(
                &format!("- {title} ({level})"),
                9.5,
                Font::Regular,
                TEXT_PRIMARY,
            );
        }
        pdf.spacer(2.0);
    }

    fn add_certifications(&self, pdf: &mut PdfWriter) {
        let certs = &self.document.blocks_by_type.certification;
        if certs.is_empty() {
            return;
        }
        self.add_section_header(pdf, "Certifications");

        for block in certs {
            let ResolvedBlockData::Certification(cert) = &block.data else {
                continue;
            };

            pdf.line(
                block.title.as_deref().unwrap_or("Certification"),
                11.5,
                Font::Bold,
                TEXT_PRIMARY,
            );

            let mut metadata = Vec::new();
            if let Some(issuer) = &cert.issuing_organization {
                metadata.push(format!("Issuer: {issuer}"));
            }
            if let Some(issued) = cert
                .issue_date
                .and_then(|d| format_display_date(&d.to_string()))
            {
                metadata.push(format!("Issued: {issued}"));
            }
            if let Some(expires) = cert
                .expiry_date
                .and_then(|d| format_display_date(&d.to_string()))
            {
                metadata.push(format!("Expires: {expires}"));
            }
            if !metadata.is_empty() {
                pdf.paragraph(&metadata.join("  -  "), 9.0, Font::Regular, TEXT_MUTED);
            }

            if let Some(credential_id) = &cert.credential_id {
                pdf.line(
                    &format!("Credential ID: {credential_id}"),
                    9.5,
                    Font::Regular,
                    TEXT_PRIMARY,
                );
            }
            if let Some(credential_url) = &cert.credential_url {
                pdf.paragraph(
                    &format!("Credential URL: {credential_url}"),
                    9.5,
                    Font::Regular,
                    TEXT_PRIMARY,
                );
            }
            pdf.spacer(2.5);
        }
    }

    fn add_misc(&self, pdf: &mut PdfWriter) {
        let misc_blocks = &self.document.blocks_by_type.misc;
        if misc_blocks.is_empty() {
            return;
        }
        self.add_section_header(pdf, "Additional Highlights");

        for block in misc_blocks {
            let ResolvedBlockData::Misc(misc) = &block.data else {
                continue;
            };

            pdf.line(
                block.title.as_deref().unwrap_or("Additional Item"),
                11.5,
                Font::Bold,
                TEXT_PRIMARY,
            );
            if let Some(content) = &misc.content {
                pdf.paragraph(content, 10.0, Font::Regular, TEXT_PRIMARY);
            }
            pdf.spacer(2.5);
        }
    }
}

/// Exports a stored snapshot blob to PDF bytes plus a suggested filename.
pub fn export_profile_to_pdf(
    profile_data: &str,
    company_name: Option<&str>,
    accent_color: Option<&str>,
    template: Option<&str>,
) -> Result<(Vec<u8>, String), AppError> {
    let template = template.unwrap_or("default");
    if template != "default" {
        return Err(AppError::Validation(format!(
            "Unsupported export template: {template}"
        )));
    }

    let document: SnapshotDocument = serde_json::from_str(profile_data)
        .map_err(|e| anyhow!("stored profile data is not a valid snapshot: {e}"))?;

    let generator = ProfilePdfGenerator::new(&document, company_name, accent_color);
    let pdf_bytes = generator.generate()?;

    let consultant_name = format!(
        "{} {}",
        document.consultant.first_name, document.consultant.last_name
    )
    .trim()
    .to_string();
    let filename = if consultant_name.is_empty() {
        "consultant_profile.pdf".to_string()
    } else {
        sanitize_filename(&format!("{consultant_name}_Profile.pdf"))
    };

    Ok((pdf_bytes, filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::snapshot::{
        BlocksByType, ConsultantIdentity, GeneralSection, ResolvedBlock, ResolvedSkill,
    };
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_document() -> SnapshotDocument {
        let mut blocks = BlocksByType::default();
        blocks.push(ResolvedBlock {
            id: Uuid::new_v4(),
            title: Some("Rust".to_string()),
            data: ResolvedBlockData::Skill(ResolvedSkill {
                level: Some("Expert".to_string()),
            }),
        });
        SnapshotDocument {
            consultant: ConsultantIdentity {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                title: "Principal Consultant".to_string(),
                email: "ada@example.com".to_string(),
                photo_url: None,
            },
            blocks_by_type: blocks,
            generated_at: Utc::now(),
            general_customizations: GeneralSection {
                role: Some("Data Engineer".to_string()),
                focus_areas: vec!["Streaming".to_string()],
                years_experience: Some(12),
                motto: Some("Measure twice".to_string()),
            },
        }
    }

    #[test]
    fn test_wrap_text_short_line_untouched() {
        assert_eq!(wrap_text("hello world", 80), vec!["hello world"]);
    }

    #[test]
    fn test_wrap_text_wraps_at_limit() {
        let lines = wrap_text("aaa bbb ccc", 7);
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_wrap_text_splits_overlong_word() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_text_preserves_blank_lines() {
        let lines = wrap_text("a\n\nb", 10);
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn test_generate_produces_pdf_bytes() {
        let document = sample_document();
        let generator = ProfilePdfGenerator::new(&document, Some("ACME"), Some("#FF0000"));
        let bytes = generator.generate().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_export_round_trip_from_stored_blob() {
        let blob = serde_json::to_string(&sample_document()).unwrap();
        let (bytes, filename) = export_profile_to_pdf(&blob, None, None, None).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(filename, "Ada_Lovelace_Profile.pdf");
    }

    #[test]
    fn test_unknown_template_rejected() {
        let blob = serde_json::to_string(&sample_document()).unwrap();
        let err = export_profile_to_pdf(&blob, None, None, Some("fancy"));
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_corrupt_blob_is_not_a_validation_error() {
        let err = export_profile_to_pdf("not json", None, None, None);
        assert!(matches!(err, Err(AppError::Internal(_))));
    }
}
