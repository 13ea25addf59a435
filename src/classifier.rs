use crate::error::Error;
use crate::filter::KeywordSet;
use crate::llm::{CompletionRequest, LanguageModel};
use crate::results::PageClassification;
use crate::utils::truncate_chars;

const CLASSIFY_MAX_TOKENS: u32 = 10;

const CLASSIFY_INSTRUCTIONS: &str = "\
You are a helpful, very diligent research assistant that classifies webpages as 'single' \
(about a specific food bank or pantry), 'directory' (a list, directory, guide, review site, or \
ranking of multiple food banks), or 'other' (not related to food banks).

Classify this webpage content as:
- 'single': about a specific food bank or pantry (even if it's a social media page, listing, or get-help page)
- 'directory': a list, directory, guide, review site, or ranking of multiple food banks (even if it's just a few)
- 'other': not related to food banks

Be VERY generous with 'directory' classification:
- If it mentions multiple food banks, classify as directory
- If it's a review site (like Yelp), classify as directory
- If it's a ranking or 'best of' list, classify as directory
- If it lists services or resources, classify as directory
- If it's a guide or resource page, classify as directory
- If the title mentions 'food banks' (plural), likely directory

Be generous with 'single' classification - if it mentions a food bank name, service, or has \
'get-help' in URL, classify as single.
Pages with 'get-help', 'find-a-foodbank', or specific food bank names should be 'single'.
Only return: single, directory, or other";

/// How a classification was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    /// The URL contained a directory indicator; the model was not asked
    UrlIndicator,
    /// The model answered
    Model,
    /// The model call failed; defaulted to `Other`
    Fallback,
}

/// Sorts fetched pages into single food banks, directories and everything else.
///
/// Tuned to over-include: a wasted extraction is cheaper than a missed food bank.
pub struct PageClassifier<'a> {
    model: &'a dyn LanguageModel,
    url_indicators: KeywordSet,
    text_limit: usize,
}

impl<'a> PageClassifier<'a> {
    pub fn new(model: &'a dyn LanguageModel, url_indicators: KeywordSet, text_limit: usize) -> Self {
        Self {
            model,
            url_indicators,
            text_limit,
        }
    }

    /// The directory indicator contained in `url`, if any
    pub fn url_indicator(&self, url: &str) -> Option<&str> {
        self.url_indicators.first_match(url)
    }

    /// Classify a page. A URL carrying a directory indicator always wins over the model.
    pub async fn classify(
        &self,
        text: &str,
        url: Option<&str>,
    ) -> (PageClassification, ClassificationSource) {
        if let Some(indicator) = url.and_then(|u| self.url_indicator(u)) {
            ::log::debug!("URL indicator '{}' marks page as directory", indicator);
            return (
                PageClassification::Directory,
                ClassificationSource::UrlIndicator,
            );
        }

        let prompt = format!(
            "{}\n\nCONTENT:\n{}",
            CLASSIFY_INSTRUCTIONS,
            truncate_chars(text, self.text_limit)
        );

        match self
            .model
            .complete(CompletionRequest::new(prompt, CLASSIFY_MAX_TOKENS))
            .await
        {
            Ok(answer) => (
                PageClassification::from_label(&answer),
                ClassificationSource::Model,
            ),
            Err(e) => {
                ::log::warn!("{}", Error::Classification(e.to_string()));
                (PageClassification::Other, ClassificationSource::Fallback)
            }
        }
    }
}
