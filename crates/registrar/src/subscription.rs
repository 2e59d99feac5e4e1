/// One monitored occurrence on a device, as fed into a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorEvent {
    pub device_id: String,
    /// GB28181 alarm method code ("1" phone, "2" device, "5" video...).
    pub alarm_method: String,
    pub alarm_type: String,
    pub priority: u8,
    pub time: String,
}

/// Required operations of an event-package subscription.
///
/// A device that SUBSCRIBEs (or, like GB28181 alarms, is implicitly
/// subscribed on registration) gets a subscription object per dialog;
/// the notify sender drives it through this interface without knowing
/// the package.
pub trait Subscription: Send {
    /// Event package name for the `Event` header.
    fn event_package(&self) -> &str;

    /// Content type of the NOTIFY body.
    fn notify_content_type(&self) -> &str;

    /// Whether the next NOTIFY carries full state rather than the delta
    /// since the last one.
    fn full_state(&self) -> bool;

    /// Whether this subscription wants the event at all.
    fn monitor_filter(&self, event: &MonitorEvent) -> bool;

    fn add_monitor_event(&mut self, event: MonitorEvent);

    /// Body for the next NOTIFY, rendered from the pending events.
    fn notify_body(&self) -> String;

    /// The transport delivered a NOTIFY; pending state is consumed and
    /// the dialog serial advances.
    fn notification_sent(&mut self);
}

/// GB28181 alarm subscription for one device.
///
/// Renders pending alarms as MANSCDP `<Notify><CmdType>Alarm</CmdType>`
/// documents, one SN per delivery.
pub struct AlarmSubscription {
    device_id: String,
    serial: u32,
    pending: Vec<MonitorEvent>,
}

impl AlarmSubscription {
    pub fn new(device_id: &str) -> Self {
        Self {
            device_id: device_id.to_string(),
            serial: 1,
            pending: Vec::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Subscription for AlarmSubscription {
    fn event_package(&self) -> &str {
        "presence"
    }

    fn notify_content_type(&self) -> &str {
        "Application/MANSCDP+xml"
    }

    fn full_state(&self) -> bool {
        // Alarms are inherently deltas; there is no full state to replay.
        false
    }

    fn monitor_filter(&self, event: &MonitorEvent) -> bool {
        event.device_id == self.device_id
    }

    fn add_monitor_event(&mut self, event: MonitorEvent) {
        self.pending.push(event);
    }

    fn notify_body(&self) -> String {
        let mut body = String::from("<?xml version=\"1.0\"?>\r\n");
        for event in &self.pending {
            body.push_str(&format!(
                "<Notify>\r\n\
                 <CmdType>Alarm</CmdType>\r\n\
                 <SN>{}</SN>\r\n\
                 <DeviceID>{}</DeviceID>\r\n\
                 <AlarmPriority>{}</AlarmPriority>\r\n\
                 <AlarmMethod>{}</AlarmMethod>\r\n\
                 <AlarmType>{}</AlarmType>\r\n\
                 <AlarmTime>{}</AlarmTime>\r\n\
                 </Notify>\r\n",
                self.serial, event.device_id, event.priority, event.alarm_method,
                event.alarm_type, event.time,
            ));
        }

        body
    }

    fn notification_sent(&mut self) {
        self.serial += 1;
        self.pending.clear();
    }
}
