/// Instruction sent to the generative backend for every source post.
///
/// Title and body are substituted verbatim; an absent body is sent as an
/// empty block.
pub fn build_prompt(title: &str, body: &str) -> String {
    format!(
        "\
You are an expert blog writer who turns informal community discussions into polished, engaging articles.

Rewrite the following Reddit post as a complete blog article that:
- Has a clear title, introduction, body, and conclusion.
- Keeps the facts accurate while dropping Reddit formatting and noise.
- Reads naturally, like a blog post written by a person.
- Uses smooth transitions, a conversational tone, and clear paragraphs.
- Adds brief context so a reader who never saw the post can follow along.
- Mentions community takeaways or insights where relevant.
- Stays between 400 and 600 words.

Reddit Post Title: {title}
Reddit Post Content:
{body}

Now write the final article in plain text: no markdown, no lists, just a well-written narrative.
"
    )
}
