// file: src/repository/classifier.rs
// description: web framework and route classification for test generation
// reference: flask, fastapi and django routing conventions

use crate::models::CodeUnit;
use crate::parser::patterns::{
    DJANGO_IMPORT, FASTAPI_IMPORT, FLASK_IMPORT, ROUTE_DECORATOR, ROUTE_METHODS,
};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WebFramework {
    Flask,
    FastApi,
    Django,
}

impl WebFramework {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebFramework::Flask => "flask",
            WebFramework::FastApi => "fastapi",
            WebFramework::Django => "django",
        }
    }

    /// Imports a generated test module needs to drive this framework.
    pub fn test_imports(&self) -> &'static [&'static str] {
        match self {
            WebFramework::Flask => &[
                "import flask",
                "from flask import Flask",
                "from flask.testing import FlaskClient",
            ],
            WebFramework::FastApi => &[
                "from fastapi import FastAPI",
                "from fastapi.testclient import TestClient",
            ],
            WebFramework::Django => &[
                "from django.test import TestCase, Client",
                "from django.urls import reverse",
            ],
        }
    }
}

impl fmt::Display for WebFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: String,
    pub path: String,
}

pub struct FrameworkClassifier;

impl FrameworkClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Detects the web framework a source file is written against.
    /// The first match in Flask, FastAPI, Django order wins.
    pub fn detect(&self, source: &str) -> Option<WebFramework> {
        if FLASK_IMPORT.is_match(source) {
            Some(WebFramework::Flask)
        } else if FASTAPI_IMPORT.is_match(source) {
            Some(WebFramework::FastApi)
        } else if DJANGO_IMPORT.is_match(source) {
            Some(WebFramework::Django)
        } else {
            None
        }
    }

    /// Route metadata for callables decorated as HTTP endpoints.
    pub fn route_info(&self, unit: &CodeUnit) -> Option<RouteInfo> {
        if !unit.kind.is_callable() {
            return None;
        }

        unit.decorators.iter().find_map(|decorator| {
            let captures = ROUTE_DECORATOR.captures(decorator.trim())?;
            let verb = captures.get(1)?.as_str();
            let path = captures.get(2)?.as_str().to_string();

            let method = if verb == "route" {
                ROUTE_METHODS
                    .captures(decorator)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().to_uppercase())
                    .unwrap_or_else(|| "GET".to_string())
            } else {
                verb.to_uppercase()
            };

            Some(RouteInfo { method, path })
        })
    }
}

impl Default for FrameworkClassifier {
    fn default() -> Self {
        Self::new()
    }
}
