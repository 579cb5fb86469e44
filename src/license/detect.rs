use anyhow::Result;
use regex::Regex;

use crate::models::UNKNOWN_LICENSE;

/// Ordered patterns; the first match wins, so more specific texts come first.
const PATTERNS: &[(&str, &str)] = &[
    ("AGPL-3.0", r"(?i)GNU AFFERO GENERAL PUBLIC LICENSE\s+Version 3"),
    ("LGPL-3.0", r"(?i)GNU LESSER GENERAL PUBLIC LICENSE\s+Version 3"),
    ("LGPL-2.1", r"(?i)GNU LESSER GENERAL PUBLIC LICENSE\s+Version 2\.1"),
    ("GPL-3.0", r"(?i)GNU GENERAL PUBLIC LICENSE\s+Version 3"),
    ("GPL-2.0", r"(?i)GNU GENERAL PUBLIC LICENSE\s+Version 2"),
    ("MPL-2.0", r"(?i)Mozilla Public License,?\s+(?:Version|v\.?)\s*2\.0"),
    ("Apache-2.0", r"(?i)Apache License,?\s+Version 2\.0"),
    ("WTFPL", r"(?i)DO WHAT THE F[U*]CK YOU WANT TO PUBLIC LICENSE"),
    (
        "Unlicense",
        r"(?i)This is free and unencumbered software released into the public domain",
    ),
    ("CC0-1.0", r"(?i)CC0 1\.0 Universal"),
    ("ISC", r"(?i)\bThe ISC License\b|Permission to use, copy, modify, and/or distribute this software for any"),
    ("MIT", r"(?i)Permission is hereby granted, free of charge, to any"),
    (
        "BSD-3-Clause",
        r"(?is)Redistribution and use (?:of this software )?in source and binary forms, with or without.*Neither the name",
    ),
    (
        "BSD-2-Clause",
        r"(?i)Redistribution and use (?:of this software )?in source and binary forms, with or without",
    ),
];

/// Infers a license identifier from raw license text.
pub struct LicenseDetector {
    patterns: Vec<(&'static str, Regex)>,
}

impl LicenseDetector {
    pub fn new() -> Result<Self> {
        let patterns = PATTERNS
            .iter()
            .map(|(id, pattern)| -> Result<(&'static str, Regex)> {
                Ok((*id, Regex::new(pattern)?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Best-effort identifier for `text`, or [`UNKNOWN_LICENSE`].
    pub fn detect(&self, text: &str) -> String {
        self.patterns
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(id, _)| (*id).to_string())
            .unwrap_or_else(|| UNKNOWN_LICENSE.to_string())
    }
}
