use ob_domain::{Mode, TimeOfDay};
use ob_messaging::{ContextualMessageRequest, MessageContext, MessageGenerator, Trigger};

/// Options for `orbit message`, straight from the command line.
#[derive(Debug, Default)]
pub struct MessageArgs {
    pub trigger: String,
    pub mode: Option<String>,
    pub mood: Option<String>,
    pub time_of_day: Option<String>,
    pub json: bool,
}

/// Build the request the API would receive for these arguments.
pub fn build_request(args: &MessageArgs) -> anyhow::Result<ContextualMessageRequest> {
    let trigger: Trigger = args
        .trigger
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown trigger '{}'", args.trigger))?;
    let mode = match args.mode.as_deref() {
        Some(m) => Some(
            m.parse::<Mode>()
                .map_err(|_| anyhow::anyhow!("unknown mode '{m}'"))?,
        ),
        None => None,
    };
    let time_of_day = match args.time_of_day.as_deref() {
        Some(t) => Some(
            t.parse::<TimeOfDay>()
                .map_err(|_| anyhow::anyhow!("unknown time of day '{t}'"))?,
        ),
        None => None,
    };

    let context = MessageContext {
        mode,
        mood: args.mood.clone(),
        time_of_day,
        ..Default::default()
    };
    Ok(ContextualMessageRequest::new(trigger, Some(context)))
}

/// Print one contextual message generated locally.
pub fn run(generator: &MessageGenerator, args: &MessageArgs) -> anyhow::Result<()> {
    let request = build_request(args)?;
    let response = generator.handle(&request);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.chat_message.content);
    }
    Ok(())
}
