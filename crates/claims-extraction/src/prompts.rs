//! Instructions sent alongside the claim images.

pub const STATEMENT_PAIR_PROMPT: &str = r#"Extract all information from these claim statement images (front and back).
Return a structured JSON with all the information found including:
- Claim number
- Policy holder information
- Vehicle information
- Accident details
- Damages description
- Any other relevant information

Combine information from both front and back images into a single comprehensive JSON object."#;

pub const SINGLE_IMAGE_PROMPT: &str = r#"You are processing an image submitted with an insurance claim.
Return ONLY valid JSON (no markdown fences, no commentary) with these sections when the information is visible:

{
  "vehicle_info": { "make": "", "model": "", "color": "", "year": "" },
  "damage_assessment": { "severity": "minor | moderate | severe", "estimated_cost": 0, "affected_areas": [""] },
  "incident_info": { "date": "", "location": "", "description": "" }
}

Add any other relevant information as extra top-level keys. Omit sections you cannot determine."#;
