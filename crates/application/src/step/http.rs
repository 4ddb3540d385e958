//! HTTP step

use std::sync::Arc;

use apiflow_domain::{HttpExchange, HttpRequest, HttpSpec, StepSpec};
use tracing::{debug, info, warn};

use super::{Step, StepRecord, StepState, expect_state, transport_options};
use crate::context::VariableContext;
use crate::error::StepError;
use crate::expression::{Expression, Facet};
use crate::ports::{DocumentSource, HttpTransport};

/// Sends one request, checks its assertions and captures values.
pub struct HttpStep {
    spec: StepSpec,
    documents: Arc<dyn DocumentSource>,
    transport: Arc<dyn HttpTransport>,
    state: StepState,
    definition: Option<HttpSpec>,
    request: Option<HttpRequest>,
    record: Option<StepRecord>,
}

impl HttpStep {
    /// Creates a step for `spec`. Nothing is loaded until `pre_process`.
    #[must_use]
    pub fn new(
        spec: StepSpec,
        documents: Arc<dyn DocumentSource>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            spec,
            documents,
            transport,
            state: StepState::Created,
            definition: None,
            request: None,
            record: None,
        }
    }

    /// The resolved definition, after `pre_process`.
    #[must_use]
    pub const fn definition(&self) -> Option<&HttpSpec> {
        self.definition.as_ref()
    }

    /// The request built from the resolved definition, after `pre_process`.
    #[must_use]
    pub const fn request(&self) -> Option<&HttpRequest> {
        self.request.as_ref()
    }

    fn load(&self, context: &VariableContext) -> Result<(HttpSpec, HttpRequest), StepError> {
        let reference = self.spec.reference.as_str();
        let definition = self
            .documents
            .read_text(reference)
            .and_then(|text| self.documents.parse_http_spec(reference, &text))
            .map_err(|e| StepError::definition(reference, e))?;

        let resolved = definition.resolve_with(|text| context.resolve(text));
        let request = resolved
            .to_request()
            .map_err(|e| StepError::definition(reference, e))?;
        Ok((resolved, request))
    }

    fn check_assertions(&self, definition: &HttpSpec, exchange: &HttpExchange) -> Result<(), StepError> {
        for (name, text) in &definition.asserts {
            let expression_error = |source| StepError::AssertionExpression {
                name: name.clone(),
                source,
            };
            let expression: Expression = text.parse().map_err(expression_error)?;
            let actual = expression
                .extract(exchange, Facet::Response)
                .map_err(expression_error)?;
            expression
                .verify(actual.as_deref())
                .map_err(|mismatch| StepError::Assertion {
                    name: name.clone(),
                    message: mismatch.message,
                })?;
            debug!(step = %self.spec.id, assertion = %name, "Assertion passed");
        }
        Ok(())
    }

    /// Evaluates every capture; absent values are skipped with a warning.
    fn evaluate_captures(&self) -> Result<Vec<(String, String)>, StepError> {
        let (Some(definition), Some(record)) = (&self.definition, &self.record) else {
            return Err(StepError::InvalidState {
                action: "post-process",
                state: self.state,
            });
        };

        let mut captured = Vec::new();
        for (name, text) in &definition.captures {
            let value = text
                .parse::<Expression>()
                .and_then(|expression| expression.extract(record.exchange(), Facet::Response))
                .map_err(|source| StepError::Capture {
                    name: name.clone(),
                    source,
                })?;
            match value {
                Some(value) => captured.push((name.clone(), value)),
                None => warn!(step = %self.spec.id, capture = %name, "Capture selected no value"),
            }
        }
        Ok(captured)
    }

    fn fail<T>(&mut self, error: StepError) -> Result<T, StepError> {
        self.state = StepState::Failed;
        Err(error)
    }
}

impl Step for HttpStep {
    fn spec(&self) -> &StepSpec {
        &self.spec
    }

    fn state(&self) -> StepState {
        self.state
    }

    fn pre_process(&mut self, context: &VariableContext) -> Result<(), StepError> {
        expect_state(self.state, StepState::Created, "pre-process")?;
        match self.load(context) {
            Ok((definition, request)) => {
                self.definition = Some(definition);
                self.request = Some(request);
                self.state = StepState::PreProcessed;
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    fn process(&mut self, context: &mut VariableContext) -> Result<(), StepError> {
        expect_state(self.state, StepState::PreProcessed, "process")?;
        let (Some(definition), Some(request)) = (self.definition.clone(), self.request.clone())
        else {
            return Err(StepError::InvalidState {
                action: "process",
                state: self.state,
            });
        };

        let options = match transport_options(context) {
            Ok(options) => options,
            Err(e) => return self.fail(StepError::definition(&self.spec.reference, e)),
        };

        info!(step = %self.spec.id, method = %request.method, url = %request.url, "Sending request");
        let response = match self.transport.send(&request, &options) {
            Ok(response) => response,
            Err(e) => return self.fail(e.into()),
        };
        info!(
            step = %self.spec.id,
            status = response.status,
            elapsed_ms = response.elapsed_ms(),
            "Received response"
        );

        let exchange = HttpExchange::new(request, response);
        let record = StepRecord::Http(exchange.clone());
        context.record(self.spec.id.clone(), record.clone());
        self.record = Some(record);

        match self.check_assertions(&definition, &exchange) {
            Ok(()) => {
                self.state = StepState::Processed;
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    fn post_process(&mut self, context: &mut VariableContext) -> Result<(), StepError> {
        expect_state(self.state, StepState::Processed, "post-process")?;
        let captured = match self.evaluate_captures() {
            Ok(captured) => captured,
            Err(e) => return self.fail(e),
        };

        for (name, value) in captured {
            debug!(step = %self.spec.id, capture = %name, "Captured value");
            context.capture(&self.spec.id, &name, value);
        }
        self.state = StepState::PostProcessed;
        Ok(())
    }

    fn record(&self) -> Option<&StepRecord> {
        self.record.as_ref()
    }
}
