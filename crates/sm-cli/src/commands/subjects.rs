use sm_core::catalog;

pub fn run(subject: Option<&str>) -> anyhow::Result<()> {
    match subject {
        Some(key) => {
            let subject = catalog::find_subject(key)
                .ok_or_else(|| anyhow::anyhow!("unknown subject `{key}` — try `sm subjects`"))?;
            println!("{}", subject.name);
            if let Some(desc) = &subject.description {
                println!("  {desc}");
            }
            for topic in &subject.topics {
                println!("  - {} ({})", topic.name, topic.subtopics.join(", "));
            }
        }
        None => {
            for subject in catalog::subjects() {
                let topics: Vec<&str> = subject.topics.iter().map(|t| t.name.as_str()).collect();
                println!("{:12} {}", subject.id, topics.join(", "));
            }
        }
    }
    Ok(())
}
